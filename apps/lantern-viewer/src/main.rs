//! Lantern viewer: renders one document in a window, or dumps its display list.

mod app;
mod color;
mod measure;

use app::LanternApp;
use clap::Parser;
use eframe::egui;
use ln_core::LanternError;
use ln_core::LanternResult;
use ln_layout::ApproximateTextMeasurer;
use ln_net::NetFetcher;
use ln_net::ResourceUrl;
use ln_paint::DrawCommand;
use ln_renderer::Page;
use ln_renderer::RendererConfig;
use std::path::Path;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "lantern", version, about = "Render an HTML document")]
struct Args {
    /// URL (`http`, `https`, `file`) or local file path.
    address: String,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Print the display list and exit instead of opening a window.
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let url = resolve_address(&args.address).map_err(|error| error.to_string())?;
    let mut config = RendererConfig::default();
    config.layout = config.layout.with_viewport_width(args.width);

    if args.dump {
        return dump(url, config).map_err(|error| error.to_string());
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Lantern")
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Lantern",
        native_options,
        Box::new(move |_cc| Ok(Box::new(LanternApp::new(url, config)))),
    )
    .map_err(|error| error.to_string())
}

/// Accepts a URL, or a path that is turned into a `file` URL.
fn resolve_address(address: &str) -> LanternResult<ResourceUrl> {
    let address = address.trim();
    if address.contains("://") {
        return ResourceUrl::parse(address);
    }

    let absolute = std::path::absolute(Path::new(address)).map_err(|error| {
        LanternError::new(
            "viewer.path_invalid",
            format!("cannot resolve path `{address}`: {error}"),
        )
    })?;
    ResourceUrl::from_file_path(&absolute)
}

fn dump(url: ResourceUrl, config: RendererConfig) -> LanternResult<()> {
    let fetcher = NetFetcher::new();
    let mut page = Page::new(config, ApproximateTextMeasurer);
    page.load(&fetcher, url)?;

    for command in page.display_list().iter() {
        println!("{}", describe(command));
    }
    Ok(())
}

fn describe(command: &DrawCommand) -> String {
    match command {
        DrawCommand::FillRect { rect, color } => format!(
            "rect {} {} {} {} {color}",
            rect.x, rect.y, rect.width, rect.height
        ),
        DrawCommand::Text {
            rect,
            text,
            font,
            color,
        } => format!("text {} {} {text:?} {font} {color}", rect.x, rect.y),
        DrawCommand::Line {
            from,
            to,
            color,
            thickness,
        } => format!(
            "line {} {} {} {} {color} {thickness}",
            from.x, from.y, to.x, to.y
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::describe;
    use super::resolve_address;
    use ln_layout::FontKey;
    use ln_layout::FontSlant;
    use ln_layout::FontWeight;
    use ln_layout::Rect;
    use ln_net::Scheme;
    use ln_paint::DrawCommand;
    use ln_paint::Point;

    #[test]
    fn urls_pass_through() {
        let url = match resolve_address(" http://example.org/a.html ") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(url.as_str(), "http://example.org/a.html");
    }

    #[test]
    fn paths_become_file_urls() {
        let url = match resolve_address("docs/index.html") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(url.scheme(), Scheme::File);
        assert!(url.as_str().ends_with("/docs/index.html"));
    }

    #[test]
    fn describes_each_command_on_one_line() {
        let font = FontKey::new(12, FontWeight::Bold, FontSlant::Roman);
        let text = DrawCommand::Text {
            rect: Rect::new(13.0, 21.0, 40.0, 16.0),
            text: "hello".to_owned(),
            font,
            color: "black".to_owned(),
        };
        assert_eq!(describe(&text), format!("text 13 21 \"hello\" {font} black"));

        let fill = DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.5, 10.0, 20.0),
            color: "gray".to_owned(),
        };
        assert_eq!(describe(&fill), "rect 0 0.5 10 20 gray");

        let caret = DrawCommand::Line {
            from: Point::new(29.0, 21.0),
            to: Point::new(29.0, 37.0),
            color: "black".to_owned(),
            thickness: 1.0,
        };
        assert_eq!(describe(&caret), "line 29 21 29 37 black 1");
    }
}
