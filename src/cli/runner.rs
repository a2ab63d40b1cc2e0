use std::io::Write;
use std::path::Path;

use tracing::info;

use sensormeta::api::{export_image_metadata, process_directory_to_path, read_image_metadata};
use sensormeta::io::geom::geom_text;
use sensormeta::sensors::{register_built_in_factories, registered_parser_names};
use sensormeta::types::ExportFormat;
use sensormeta::{ExportParams, ImageMetadata};

use super::args::CliArgs;
use super::errors::AppError;

fn export_params(args: &CliArgs) -> Result<ExportParams, AppError> {
    let mut params = match &args.preset {
        Some(path) => ExportParams::from_json_file(path)?,
        None => ExportParams::default(),
    };
    if let Some(format) = args.format {
        params.format = format;
    }
    if args.compact {
        params.compact = true;
    }
    if args.single_line {
        params.multiline = false;
    }
    if let Some(bands) = args.bands {
        if bands == 0 {
            return Err(AppError::ZeroBands { bands });
        }
        params.expected_bands = Some(bands);
    }
    Ok(params)
}

fn print_metadata(imd: &ImageMetadata, params: &ExportParams) -> Result<(), AppError> {
    let text = match params.format {
        ExportFormat::Geom => geom_text(imd),
        ExportFormat::Json => serde_json::to_string_pretty(&imd.to_json_value())
            .map_err(sensormeta::Error::from)?,
        ExportFormat::Text => imd.to_json(params.multiline),
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

fn process_single_file(
    input: &Path,
    output: Option<&Path>,
    params: &ExportParams,
) -> Result<(), AppError> {
    let imd = read_image_metadata(input, params)?;
    match output {
        Some(output) => {
            export_image_metadata(&imd, output, params)?;
            info!("Successfully exported: {:?} -> {:?}", input, output);
        }
        None => print_metadata(&imd, params)?,
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    register_built_in_factories();
    if args.list_parsers {
        for name in registered_parser_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let params = export_params(&args)?;
    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch export from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);
        let report = process_directory_to_path(&input_dir, &output_dir, &params, args.batch)?;
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        process_single_file(&input, args.output.as_deref(), &params)?;
    }

    Ok(())
}
