use crate::cli::{Cli, Commands, EncodeOptions};
use ffshrink::config::Config;
use ffshrink::engine::{
    self, AccelBackend, BatchEvent, CancelFlag, ConversionOutcome, ConversionTask,
    ConvertSettings, Converter, Ffprobe, ProcessRunner, TaskPlan, WorkDir,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;

pub fn run(cli: Cli) {
    // Handle subcommands first
    if let Some(command) = cli.command {
        match command {
            Commands::CheckFfmpeg => handle_check_ffmpeg(),
            Commands::Hwaccels => handle_hwaccels(),
            Commands::Probe { file } => handle_probe(&file),
            Commands::DryRun {
                inputs,
                output,
                options,
            } => handle_dry_run(inputs, output, &options),
            Commands::InitConfig => handle_init_config(),
        }
        return;
    }

    handle_convert(cli.inputs, cli.output, &cli.options);
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!("{:#}; using built-in defaults", e);
        Config::default()
    })
}

/// Merge config file values with command line overrides. Detection runs here,
/// once per process.
fn build_settings(config: &Config, options: &EncodeOptions) -> ConvertSettings {
    let mut policy = config.encoding.clone();
    if let Some(crf) = options.crf {
        policy.crf = crf;
    }
    if let Some(preset) = &options.preset {
        policy.preset = preset.clone();
    }
    if let Some(level) = &options.level {
        policy.level = level.clone();
    }
    if let Some(size) = options.mux_queue_size {
        policy.max_muxing_queue_size = size;
    }
    if options.no_tune {
        policy.tune_animation = false;
    }
    if options.no_attachments {
        policy.copy_attachments = false;
    }

    let hwaccel = if options.no_hwaccel || !config.batch.use_hwaccel {
        None
    } else if let Some(forced) = options.hwaccel {
        Some(forced)
    } else {
        engine::detect_hwaccel()
    };

    ConvertSettings {
        policy,
        hwaccel,
        overwrite: options.overwrite || config.batch.overwrite,
        skip_if_compliant: config.batch.skip_if_compliant && !options.no_skip_compliant,
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Absolute input roots; entries that are not directories are dropped
fn resolve_inputs(mut inputs: Vec<PathBuf>) -> Vec<PathBuf> {
    if inputs.is_empty() {
        inputs.push(current_dir());
    }
    inputs
        .into_iter()
        .filter_map(|p| match p.canonicalize() {
            Ok(abs) if abs.is_dir() => Some(abs),
            _ => {
                eprintln!("Skipping {}: not a directory", p.display());
                None
            }
        })
        .collect()
}

/// Absolute output root, matching the canonical input roots. Touches nothing
/// on disk, so the root may not exist yet.
fn absolute_output(output: Option<PathBuf>) -> PathBuf {
    let out = output.unwrap_or_else(current_dir);
    out.canonicalize()
        .or_else(|_| std::path::absolute(&out))
        .unwrap_or(out)
}

fn resolve_output(output: Option<PathBuf>) -> PathBuf {
    let out = absolute_output(output);
    if let Err(e) = std::fs::create_dir_all(&out) {
        eprintln!("Cannot create output directory {}: {}", out.display(), e);
        process::exit(1);
    }
    out.canonicalize().unwrap_or(out)
}

fn make_converter(
    settings: ConvertSettings,
    runner: ProcessRunner,
    temp_dir: Option<&Path>,
) -> Converter<ProcessRunner, Ffprobe> {
    match WorkDir::new(temp_dir) {
        Ok(work_dir) => Converter::new(settings, runner, Ffprobe, work_dir),
        Err(e) => {
            eprintln!("Cannot create temporary directory: {}", e);
            process::exit(1);
        }
    }
}

fn install_interrupt_handler(cancel: &CancelFlag) {
    let flag = cancel.clone();
    let result = ctrlc::set_handler(move || {
        if flag.is_cancelled() {
            // Second Ctrl+C - force exit
            process::exit(130);
        }
        eprintln!("\nInterrupted, stopping current file...");
        flag.cancel();
    });
    if let Err(e) = result {
        warn!("Could not install Ctrl+C handler: {}", e);
    }
}

fn hwaccel_name(backend: Option<AccelBackend>) -> &'static str {
    backend.map(|b| b.ffmpeg_name()).unwrap_or("none")
}

fn print_outcome(task: &ConversionTask, outcome: &ConversionOutcome) {
    let out = task.output_path();
    match outcome {
        ConversionOutcome::Encoded => println!("  ✔ Encoded -> {}", out.display()),
        ConversionOutcome::Remuxed => println!(
            "  ✔ Already 480p; remuxed (audio->AAC) -> {}",
            out.display()
        ),
        ConversionOutcome::SkippedExists => {
            println!("  ↷ Exists, skipped -> {}", out.display())
        }
        ConversionOutcome::Failed(engine::ConvertError::Cancelled) => println!("\nInterrupted."),
        ConversionOutcome::Failed(e) => println!("  ✖ {} -> {}", e, out.display()),
    }
}

fn handle_convert(inputs: Vec<PathBuf>, output: Option<PathBuf>, options: &EncodeOptions) {
    let config = load_config();
    let roots = resolve_inputs(inputs);
    let output_root = resolve_output(output);

    let tasks = engine::collect_tasks(&roots, &output_root);
    if tasks.is_empty() {
        println!("No video files found.");
        return;
    }

    let settings = build_settings(&config, options);
    println!("Detected hwaccel: {}", hwaccel_name(settings.hwaccel));
    println!(
        "Copy attachments = {}; max muxing queue size = {}",
        settings.policy.copy_attachments, settings.policy.max_muxing_queue_size
    );

    let cancel = CancelFlag::new();
    install_interrupt_handler(&cancel);

    let temp_dir = options.temp_dir.as_deref().or(config.batch.temp_dir.as_deref());
    let converter = make_converter(settings, ProcessRunner::new(cancel), temp_dir);

    let stats = engine::run_batch(&converter, &tasks, |event| match event {
        BatchEvent::Started { index, total, task } => {
            println!("[{}/{}] {}", index, total, task.relative_source().display());
        }
        BatchEvent::Finished { task, outcome, .. } => print_outcome(task, outcome),
    });

    println!("\nSummary: {}", stats);

    // Exit skips destructors; remove the work directory first
    drop(converter);
    process::exit(stats.exit_code());
}

fn handle_dry_run(inputs: Vec<PathBuf>, output: Option<PathBuf>, options: &EncodeOptions) {
    let config = load_config();
    let roots = resolve_inputs(inputs);
    let output_root = absolute_output(output);

    let tasks = engine::collect_tasks(&roots, &output_root);
    if tasks.is_empty() {
        println!("No video files found.");
        return;
    }

    let settings = build_settings(&config, options);
    println!("# hwaccel: {}", hwaccel_name(settings.hwaccel));

    for task in &tasks {
        println!("# {}", task.source_file.display());
        match settings.plan(task, &Ffprobe) {
            TaskPlan::Skip { output } => println!("#   exists, skip -> {}", output.display()),
            TaskPlan::Run { output, attempts } => {
                for mode in attempts {
                    let cmd = engine::build_ffmpeg_cmd(
                        mode,
                        &task.source_file,
                        &output,
                        &settings.policy,
                        settings.overwrite,
                    );
                    println!("#   {}", mode.label());
                    println!("{}", engine::format_ffmpeg_cmd(&cmd));
                }
            }
        }
    }
}

fn handle_check_ffmpeg() {
    match engine::ffmpeg_version() {
        Ok(version) => {
            println!("ffmpeg found: {}", version);
            match engine::ffprobe_version() {
                Ok(probe_version) => {
                    println!("ffprobe found: {}", probe_version);
                    process::exit(0);
                }
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_hwaccels() {
    let preference: Vec<&str> = engine::hardware::platform_preference()
        .iter()
        .map(|b| b.ffmpeg_name())
        .collect();
    println!("Preference order: {}", preference.join(", "));
    println!("Selected: {}", hwaccel_name(engine::detect_hwaccel()));
}

fn handle_probe(file: &Path) {
    let profile = engine::probe_stream(file);
    if profile.is_empty() {
        eprintln!("No video stream information for {}", file.display());
        process::exit(1);
    }

    let show = |v: Option<String>| v.unwrap_or_else(|| "?".to_string());
    println!("Codec:   {}", show(profile.codec_name.clone()));
    println!("Pix fmt: {}", show(profile.pix_fmt.clone()));
    println!(
        "Size:    {}x{}",
        show(profile.width.map(|w| w.to_string())),
        show(profile.height.map(|h| h.to_string()))
    );

    let config = load_config();
    let policy = &config.encoding;
    if engine::is_compliant(&profile, policy) {
        println!("Already within target profile: would remux");
    } else if let (Some(w), Some(h)) = (profile.width, profile.height) {
        let (tw, th) = engine::target_dimensions(w, h, policy.max_width, policy.max_height);
        println!("Would encode to {}x{}", tw, th);
    } else {
        println!("Would encode");
    }
}

fn handle_init_config() {
    match Config::load() {
        Ok(cfg) => {
            match Config::config_path() {
                Ok(path) => println!("Config loaded successfully from {}", path.display()),
                Err(e) => println!("Config loaded, but config path unknown: {:#}", e),
            }
            println!("{:#?}", cfg);
        }
        Err(e) => {
            println!("Config missing or invalid: {:#}", e);
            println!("Creating default config...");

            let cfg = Config::default();
            if let Err(err) = cfg.save() {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            } else {
                match Config::config_path() {
                    Ok(path) => println!("Default config saved to {}", path.display()),
                    Err(e) => println!("Default config saved (path unknown): {:#}", e),
                }
            }
        }
    }
}
