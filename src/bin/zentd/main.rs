mod args;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::{error, info, warn};
use zentexture::{
    FloatCanvas, ImageFileFormat, PackedLayer, PixelFormat, Precision, TextureContainer,
    TextureError, generate_mip_maps, read_image, save_image,
};

use args::Args;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::from_env();

    let result = if is_texture(&args.input) {
        unpack(&args)
    } else {
        pack(&args)
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}: {e}", args.input.display());
            ExitCode::FAILURE
        }
    }
}

fn is_texture(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("td"))
}

fn pack(args: &Args) -> Result<(), TextureError> {
    let image = read_image(&args.input)?;
    info!(
        "{}: {}x{} {:?}",
        args.input.display(),
        image.width,
        image.height,
        image.layout
    );

    let format = args.pixel_format();
    if format.layout() != args.format {
        warn!("{} packs as {}, ignoring -f {}", args.data_type, format.layout(), args.format);
    }

    let base = image.to_canvas()?;
    let mut levels = Vec::new();
    if args.mip_maps {
        let mips = generate_mip_maps(&base)?;
        levels.reserve(mips.len() + 1);
        levels.push(base);
        levels.extend(mips);
    } else {
        levels.push(base);
    }

    let container = pack_levels(levels, format, args.precision())?;
    container.save(&args.output)?;
    info!(
        "wrote {} layer(s) as {format} to {}",
        container.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(feature = "multithreaded")]
fn pack_levels(
    levels: Vec<FloatCanvas>,
    format: PixelFormat,
    precision: Precision,
) -> Result<TextureContainer, TextureError> {
    use rayon::prelude::*;

    levels
        .into_par_iter()
        .enumerate()
        .map(|(level, canvas)| PackedLayer::encode(canvas, format, level as i32, precision))
        .collect::<Result<Vec<_>, _>>()
        .map(TextureContainer::from_layers)
}

#[cfg(not(feature = "multithreaded"))]
fn pack_levels(
    levels: Vec<FloatCanvas>,
    format: PixelFormat,
    precision: Precision,
) -> Result<TextureContainer, TextureError> {
    levels
        .into_iter()
        .enumerate()
        .map(|(level, canvas)| PackedLayer::encode(canvas, format, level as i32, precision))
        .collect()
}

fn unpack(args: &Args) -> Result<(), TextureError> {
    // Fail before touching the container if no layer could be written.
    ImageFileFormat::from_path(&args.output)?;

    let container = TextureContainer::open(&args.input)?;
    info!("{}: {} layer(s)", args.input.display(), container.len());
    for (index, layer) in container.iter().enumerate() {
        let canvas = FloatCanvas::from_layer(layer)?;
        let path = layer_path(&args.output, index);
        save_image(&path, canvas.width(), canvas.height(), &canvas.to_rgba8())?;
        info!(
            "layer {index} (level {}, {}x{} {}) -> {}",
            layer.level(),
            layer.width(),
            layer.height(),
            layer.format(),
            path.display()
        );
    }
    Ok(())
}

/// `dir/name.ext` becomes `dir/name_<index>.ext`.
fn layer_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let mut name = format!("{stem}_{index}");
    if let Some(ext) = output.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_names() {
        assert_eq!(layer_path(Path::new("out.png"), 0), PathBuf::from("out_0.png"));
        assert_eq!(
            layer_path(Path::new("dir/mips.TGA"), 7),
            PathBuf::from("dir/mips_7.TGA")
        );
        assert_eq!(layer_path(Path::new("bare"), 2), PathBuf::from("bare_2"));
    }

    #[test]
    fn texture_detection() {
        assert!(is_texture(Path::new("a/b.td")));
        assert!(is_texture(Path::new("B.TD")));
        assert!(!is_texture(Path::new("b.png")));
        assert!(!is_texture(Path::new("td")));
    }
}
