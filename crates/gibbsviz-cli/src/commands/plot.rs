use crate::cli::PlotArgs;
use crate::config;
use crate::error::Result;
use crate::render;
use crate::utils::progress::CliProgressHandler;
use gibbsviz::core::io::export;
use gibbsviz::core::tdb::Database;
use gibbsviz::engine::progress::ProgressReporter;
use gibbsviz::workflows;
use tracing::{info, instrument, warn};

#[instrument(skip_all, name = "plot_command")]
pub fn run(args: PlotArgs) -> Result<()> {
    println!("🧪 Loading thermodynamic database...");
    let db = Database::load(&args.database)?;
    for note in db.diagnostics() {
        warn!("{}", note);
    }
    info!(
        elements = db.elements.len(),
        functions = db.functions.len(),
        phases = db.phases.len(),
        parameters = db.parameters.len(),
        "Database loaded from '{}'",
        args.database.display()
    );

    let app = config::resolve(&args)?;
    let [el_a, el_b] = &app.elements;
    println!(
        "📊 Computing {} surfaces for {}-{}...",
        app.surface.phases.len(),
        el_a,
        el_b
    );

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let set = workflows::surface::run(&db, [el_a.as_str(), el_b.as_str()], &app.surface, &reporter)?;

    if let Some(csv_path) = &args.export_csv {
        export::write_csv_to_path(&set, csv_path)?;
        println!("💾 Surfaces exported to '{}'", csv_path.display());
    }

    let plot = render::build_figure(&set, &app.plot);
    if args.open {
        plot.show_html(&args.output);
    } else {
        plot.write_html(&args.output);
    }
    println!("📈 Figure written to '{}'", args.output.display());

    Ok(())
}
