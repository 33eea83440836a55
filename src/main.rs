mod app;
mod parser;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Command that parses source text (read from stdin) into the JSON
    /// tree contract: { success, tree, error, lines }.
    #[arg(long, default_value = "python3 -m astjson")]
    parser_cmd: String,

    /// Destination for the exported { tree, nodes, links } document.
    #[arg(long, default_value = "astviz-export.json")]
    export_path: String,

    /// Source file to preload into the editor.
    #[arg(long)]
    source: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let initial_source = args.source.as_deref().and_then(|path| {
        std::fs::read_to_string(path)
            .inspect_err(|error| log::warn!("could not read {path}: {error}"))
            .ok()
    });

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "astviz",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::AstVizApp::new(
                cc,
                args.parser_cmd.clone(),
                args.export_path.clone(),
                initial_source.clone(),
            )))
        }),
    )
}
