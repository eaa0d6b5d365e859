//! Score a JSON batch with a preset or a user-supplied metric generator.

use std::path::PathBuf;

use ensemble_metrics::config::GeneratorsConfig;
use ensemble_metrics::generator::{
    GeneratorDefinition, GeneratorLoader, MetricGenerator, OutputKind, Registry, ScriptLoader,
};
use ensemble_metrics::input::{Label, OwnedOutput, ScoringBatch};
use ensemble_metrics::logging::{self, LogSink};
use ensemble_metrics::metrics::{
    ClassIndex, ConfusionMatrix, precision_recall_by_class, project, validate_shape,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    input: Option<PathBuf>,
    generator: GeneratorChoice,
    config: Option<PathBuf>,
    list: bool,
    report: bool,
    log_file: bool,
}

#[derive(Debug, Clone)]
enum GeneratorChoice {
    Preset(String),
    Source(PathBuf),
    Unset,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let sink = if options.log_file {
        LogSink::StderrAndFile
    } else {
        LogSink::Stderr
    };
    if let Err(err) = logging::init(sink) {
        eprintln!("Logging disabled: {err}");
    }

    let config = match &options.config {
        Some(path) => GeneratorsConfig::load(path),
        None => GeneratorsConfig::load_from_app_dir(),
    }
    .map_err(|err| err.to_string())?;
    let registry = Registry::with_user_generators(&config).map_err(|err| err.to_string())?;

    if options.list {
        let listing =
            serde_json::to_string_pretty(&registry.entries()).map_err(|err| err.to_string())?;
        println!("{listing}");
        return Ok(());
    }

    let input = options
        .input
        .as_ref()
        .ok_or_else(|| format!("--input is required\n\n{}", help_text()))?;
    let batch = ScoringBatch::load(input).map_err(|err| err.to_string())?;

    let (label, generator) = load_generator(&options.generator, &registry, &batch)?;
    let score = generator
        .evaluate(&batch.y_true, batch.output())
        .map_err(|err| format!("{label}: {err}"))?;
    println!("{label}: {score:.6}");

    if options.report {
        print_report(&batch)?;
    }
    Ok(())
}

fn load_generator(
    choice: &GeneratorChoice,
    registry: &Registry,
    batch: &ScoringBatch,
) -> Result<(String, Box<dyn MetricGenerator<Label>>), String> {
    match choice {
        GeneratorChoice::Preset(key) => {
            let generator = registry
                .load::<Label>(key, &ScriptLoader)
                .map_err(|err| err.to_string())?;
            Ok((key.clone(), generator))
        }
        GeneratorChoice::Source(path) => {
            let source = std::fs::read_to_string(path)
                .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "generator".to_string());
            let definition = GeneratorDefinition::new(name.clone(), source, batch.output_kind());
            let generator = GeneratorLoader::<Label>::load(&ScriptLoader, &definition)
                .map_err(|err| format!("{}: {err}", path.display()))?;
            Ok((name, generator))
        }
        GeneratorChoice::Unset => Err(format!(
            "One of --preset or --source is required\n\n{}",
            help_text()
        )),
    }
}

fn print_report(batch: &ScoringBatch) -> Result<(), String> {
    let y_pred = match &batch.y_output {
        OwnedOutput::Predictions(preds) => preds.clone(),
        OwnedOutput::Scores(scores) => {
            let classes = ClassIndex::resolve(&batch.y_true);
            validate_shape(&classes, scores.view()).map_err(|err| err.to_string())?;
            project(&classes, scores.view())
        }
    };
    let cm = ConfusionMatrix::from_labels(&batch.y_true, &y_pred);
    println!();
    println!("accuracy: {:.4}", cm.accuracy());
    for (idx, stats) in precision_recall_by_class(&cm).iter().enumerate() {
        let label = cm
            .classes()
            .get(idx)
            .map(ToString::to_string)
            .unwrap_or_default();
        println!(
            "class {:<16}  precision={:.3}  recall={:.3}  f1={:.3}  support={}",
            label, stats.precision, stats.recall, stats.f1, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..cm.n_classes() {
        let mut row = String::new();
        for pred in 0..cm.n_classes() {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        input: None,
        generator: GeneratorChoice::Unset,
        config: None,
        list: false,
        report: false,
        log_file: false,
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--input" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--input requires a value".to_string())?;
                options.input = Some(PathBuf::from(value));
            }
            "--preset" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--preset requires a value".to_string())?;
                options.generator = GeneratorChoice::Preset(value.clone());
            }
            "--source" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--source requires a value".to_string())?;
                options.generator = GeneratorChoice::Source(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--list" => options.list = true,
            "--report" => options.report = true,
            "--log-file" => options.log_file = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    let kinds = [OutputKind::Scores, OutputKind::Predictions]
        .map(|kind| kind.to_string())
        .join("|");
    [
        "ensemble-metrics-eval".to_string(),
        String::new(),
        "Usage:".to_string(),
        "  ensemble-metrics-eval --input <batch.json> (--preset <key> | --source <file>) [options]"
            .to_string(),
        "  ensemble-metrics-eval --list [--config <generators.toml>]".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --preset <key>       Registered generator key (see --list).".to_string(),
        format!("  --source <file>      Generator script; its output kind ({kinds}) follows the input."),
        "  --config <file>      Extra generators (default: generators.toml in the app dir)."
            .to_string(),
        "  --report             Print per-class statistics and the confusion matrix.".to_string(),
        "  --log-file           Also write logs to the app log directory.".to_string(),
    ]
    .join("\n")
}
