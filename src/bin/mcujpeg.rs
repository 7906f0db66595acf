//! mcujpeg CLI - inspect baseline JPEG files and run the MCU streaming
//! decoder over them.
//!
//! Decoding goes through exactly the path a display driver would use: one
//! MCU at a time, blitted into a frame that is then written to disk.

use clap::{Parser, Subcommand, ValueEnum};
use mcujpeg_rs::traits::McuDecoder;
use mcujpeg_rs::{BaselineDecoder, DecodeOptions, FileSource, JpegStreamDecoder, PixelFormat, Rgb565, Rgb888};
use std::fs;
use std::path::PathBuf;

/// MCU-streaming baseline JPEG decoder
#[derive(Parser)]
#[command(name = "mcujpeg")]
#[command(author = "mcujpeg-rs contributors")]
#[command(version)]
#[command(about = "Decode baseline JPEG images one MCU at a time", long_about = None)]
#[command(after_help = "EXAMPLES:
    mcujpeg info -i photo.jpg
    mcujpeg decode -i photo.jpg -o photo.ppm
    mcujpeg decode -i photo.jpg -o thumb.ppm --reduce
    mcujpeg decode -i photo.jpg -o frame.raw -f rgb565

Set RUST_LOG=debug (or trace) to follow the decode MCU by MCU.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a baseline JPEG file
    ///
    /// The image is streamed MCU by MCU and assembled into a single frame.
    #[command(visible_alias = "d")]
    Decode {
        /// Input JPEG file
        #[arg(short, long, help = "Path to the input image file")]
        input: PathBuf,

        /// Output file path for decoded pixels
        #[arg(short, long, help = "Path for the output file")]
        output: PathBuf,

        /// Output format: ppm (PPM/PGM) or rgb565 (raw little-endian)
        #[arg(short, long, default_value = "ppm", value_enum)]
        format: OutputFormat,

        /// Emit one pixel per 8x8 block (1/8 scale thumbnail)
        #[arg(short, long)]
        reduce: bool,
    },

    /// Display frame geometry of a JPEG file
    #[command(visible_alias = "i")]
    Info {
        /// Input file path
        #[arg(short, long, help = "Path to the image file to inspect")]
        input: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Portable PixMap (PPM, or PGM for grayscale images)
    Ppm,
    /// Raw RGB565 pixels, little-endian
    Rgb565,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            format,
            reduce,
        } => decode_image(&input, &output, &format, reduce),
        Commands::Info { input } => show_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// A decoded image assembled from MCUs.
struct Frame<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
    components: usize,
}

fn stream_frame<P: PixelFormat>(input: &PathBuf, reduce: bool) -> Result<Frame<P::Pixel>, Box<dyn std::error::Error>> {
    let mut jpeg = JpegStreamDecoder::<P>::with_options(DecodeOptions::new().with_reduce(reduce));
    jpeg.decode_file(input)?;

    let (width, height) = (jpeg.width(), jpeg.height());
    let mut pixels = vec![P::Pixel::default(); width * height];
    let mut mcus = 0usize;
    while jpeg.read() {
        let pitch = jpeg.row_pitch();
        let x0 = jpeg.mcu_x() * pitch;
        let y0 = jpeg.mcu_y() * (jpeg.image().len() / pitch);
        let extent = jpeg.mcu_extent();
        for row in 0..extent.rows {
            let src = &jpeg.image()[row * pitch..row * pitch + extent.cols];
            let dst = (y0 + row) * width + x0;
            pixels[dst..dst + extent.cols].copy_from_slice(src);
        }
        mcus += 1;
    }
    if let Some(e) = jpeg.last_error() {
        return Err(e.into());
    }
    log::info!("streamed {} MCUs", mcus);

    Ok(Frame {
        pixels,
        width,
        height,
        components: jpeg.components(),
    })
}

fn decode_image(
    input: &PathBuf,
    output: &PathBuf,
    format: &OutputFormat,
    reduce: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height, components) = match format {
        OutputFormat::Ppm => {
            let frame = stream_frame::<Rgb888>(input, reduce)?;
            write_ppm(output, &frame)?;
            (frame.width, frame.height, frame.components)
        }
        OutputFormat::Rgb565 => {
            let frame = stream_frame::<Rgb565>(input, reduce)?;
            let bytes: Vec<u8> = frame.pixels.iter().flat_map(|p| p.to_le_bytes()).collect();
            fs::write(output, bytes)?;
            (frame.width, frame.height, frame.components)
        }
    };

    println!(
        "✓ Decoded {}x{} image ({} components) to {:?}",
        width, height, components, output
    );
    Ok(())
}

fn write_ppm(path: &PathBuf, frame: &Frame<[u8; 3]>) -> std::io::Result<()> {
    let (magic, body): (&str, Vec<u8>) = if frame.components == 1 {
        ("P5", frame.pixels.iter().map(|p| p[0]).collect())
    } else {
        ("P6", frame.pixels.iter().flatten().copied().collect())
    };
    let mut out = format!("{}\n{} {}\n255\n", magic, frame.width, frame.height).into_bytes();
    out.extend_from_slice(&body);
    fs::write(path, out)
}

fn show_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = FileSource::open(input)?;
    let size = source.size();
    let decoder = BaselineDecoder::new(&mut source, false)?;
    let info = decoder.image_info();

    println!("File: {:?}", input);
    println!("Size: {} bytes", size);
    println!();
    println!("Format: JPEG 1 (Baseline)");
    println!("  Dimensions: {}x{}", info.width, info.height);
    println!("  Components: {}", info.component_count);
    println!("  Scan type:  {}", info.scan_type);
    println!("  MCU size:   {}x{}", info.mcu_width, info.mcu_height);
    println!("  MCUs:       {}x{} ({} total)", info.mcus_per_row, info.mcus_per_col, info.mcu_count());
    if decoder.restart_interval() > 0 {
        println!("  Restart:    every {} MCUs", decoder.restart_interval());
    }
    Ok(())
}
