use clap::Parser;
use fragpack::{HexMosaic, Nv12ImageMut, RgbImage};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Pack a raw RGB image into NV12 the way the GPU conversion pass does,
/// writing the same output files the original test program produced
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Raw interleaved 8-bit RGB input file
    input: PathBuf,

    #[arg(long, default_value_t = 1024)]
    width: usize,

    #[arg(long, default_value_t = 768)]
    height: usize,

    /// Directory `out.bin`, `y.bin` and `uv.bin` are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also run the hexagon mosaic filter and save the result as PNG
    #[arg(long)]
    hex: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let buf = fs::read(&args.input)?;
    let src = RgbImage::new(&buf, args.width, args.height)?;

    let mut nv12 = vec![0u8; fragpack::nv12_size(args.width, args.height)];
    let mut dst = Nv12ImageMut::from_buffer(&mut nv12, args.width, args.height)?;

    let start = Instant::now();
    fragpack::rgb_to_nv12_multi_thread(&src, &mut dst)?;
    println!(
        "packed {}x{} to NV12 in {:?}",
        args.width,
        args.height,
        start.elapsed()
    );

    let y_size = args.width * args.height;
    fs::write(args.out_dir.join("out.bin"), &nv12)?;
    fs::write(args.out_dir.join("y.bin"), &nv12[..y_size])?;
    fs::write(args.out_dir.join("uv.bin"), &nv12[y_size..])?;

    if let Some(path) = args.hex {
        let mut out = vec![0u8; args.width * args.height * 3];
        let filter = HexMosaic::default();

        let start = Instant::now();
        filter.apply_multi_thread(&src, &mut out)?;
        println!("hexagonalized in {:?}", start.elapsed());

        image::RgbImage::from_raw(args.width as u32, args.height as u32, out)
            .ok_or("output buffer does not match the image dimensions")?
            .save(&path)?;
    }

    Ok(())
}
