use std::path::PathBuf;

use argh::FromArgs;
use zentexture::{ChannelLayout, PixelFormat, Precision, StorageType};

#[derive(FromArgs, Debug)]
/// Convert images to packed `.td` textures, or `.td` textures back to images.
pub struct Args {
    /// input image, or a `.td` texture to unpack
    #[argh(option, short = 'i')]
    pub input: PathBuf,

    /// output texture; when unpacking, the image name each layer is derived from [default: result.td]
    #[argh(option, short = 'o', default = "PathBuf::from(\"result.td\")")]
    pub output: PathBuf,

    /// channel layout: ALPHA, LUMINANCE, LUMINANCE_ALPHA, RGB, RGBA [default: RGB]
    #[argh(option, short = 'f', default = "ChannelLayout::Rgb")]
    pub format: ChannelLayout,

    /// storage type: UNSIGNED_BYTE, UNSIGNED_SHORT_5_6_5, UNSIGNED_SHORT_4_4_4_4, UNSIGNED_SHORT_5_5_5_1 [default: UNSIGNED_BYTE]
    #[argh(option, long = "dt", default = "StorageType::UnsignedByte")]
    pub data_type: StorageType,

    /// generate the full mip chain
    #[argh(switch, long = "mm")]
    pub mip_maps: bool,

    /// disable dithering
    #[argh(switch, long = "dd")]
    pub disable_dither: bool,
}

impl Args {
    /// Parse the process arguments, exiting on `--help` or a usage error.
    pub fn from_env() -> Self {
        let mut raw = std::env::args();
        let cmd = raw
            .next()
            .as_deref()
            .and_then(|path| std::path::Path::new(path).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .unwrap_or_else(|| "zentd".to_owned());
        let args = normalize_legacy_flags(raw);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match <Self as FromArgs>::from_args(&[&cmd], &args) {
            Ok(args) => args,
            Err(exit) => match exit.status {
                Ok(()) => {
                    println!("{}", exit.output);
                    std::process::exit(0);
                }
                Err(()) => {
                    eprintln!("{}\nRun {cmd} --help for more information.", exit.output);
                    std::process::exit(1);
                }
            },
        }
    }

    /// Target format; a 16-bit storage type overrides `-f`.
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::new(self.format, self.data_type)
    }

    pub fn precision(&self) -> Precision {
        if self.disable_dither {
            Precision::Native
        } else {
            Precision::Dither
        }
    }
}

/// Accept the single-dash spellings `-dt`, `-mm` and `-dd`.
pub fn normalize_legacy_flags(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| match arg.as_str() {
            "-dt" | "-mm" | "-dd" => format!("-{arg}"),
            _ => arg,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        let args = normalize_legacy_flags(args.iter().map(|s| s.to_string()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Args::from_args(&["zentd"], &args)
    }

    #[test]
    fn defaults() {
        let args = parse(&["-i", "in.png"]).unwrap();
        assert_eq!(args.output, PathBuf::from("result.td"));
        assert_eq!(args.pixel_format(), PixelFormat::U8(ChannelLayout::Rgb));
        assert_eq!(args.precision(), Precision::Dither);
        assert!(!args.mip_maps);
    }

    #[test]
    fn legacy_flags() {
        let args = parse(&[
            "-i",
            "in.png",
            "-o",
            "out.td",
            "-f",
            "rgba",
            "-dt",
            "UNSIGNED_SHORT_4_4_4_4",
            "-mm",
            "-dd",
        ])
        .unwrap();
        assert_eq!(args.pixel_format(), PixelFormat::Rgba4444);
        assert!(args.mip_maps);
        assert_eq!(args.precision(), Precision::Native);
    }

    #[test]
    fn wide_storage_overrides_layout() {
        let args = parse(&["-i", "a.png", "-f", "LUMINANCE", "--dt", "UNSIGNED_SHORT_5_6_5"]).unwrap();
        assert_eq!(args.pixel_format(), PixelFormat::Rgb565);
    }

    #[test]
    fn input_is_required() {
        assert!(parse(&["-o", "x.td"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(parse(&["-i", "a.png", "-f", "BGRA"]).is_err());
    }
}
