//! Hex-dump a mapped byte range of a file.
//!
//! ```text
//! mmdump <file> <mode> <length> <offset>
//! ```
//!
//! `mode` is a mode string such as `r`, `re`, or `rp`; with `e` the length
//! argument is ignored and the dump runs to the end of the file.

use std::env;

use anyhow::{bail, Context, Result};

use mmap_view::MappedView;

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        bail!("usage: mmdump <file> <mode> <length> <offset>");
    }
    let len: usize = args[3]
        .parse()
        .context("length must be an unsigned integer")?;
    let offset: u64 = args[4]
        .parse()
        .context("offset must be an unsigned integer")?;

    let view = MappedView::open(&args[1], args[2].as_str(), len, offset)
        .with_context(|| format!("failed to map file '{}'", args[1]))?;
    dump(view.as_slice());
    Ok(())
}

/// Print rows of 16 bytes: offset, hex in groups of four, printable ASCII.
fn dump(bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        print!("{:4x}:", row * 16);
        for col in 0..16 {
            if col % 4 == 0 {
                print!(" ");
            }
            match chunk.get(col) {
                Some(b) => print!("{b:02x}"),
                None => print!("  "),
            }
        }
        print!(" | ");
        for col in 0..16 {
            match chunk.get(col) {
                Some(&b) if b.is_ascii_graphic() || b == b' ' => print!("{}", b as char),
                Some(_) => print!("."),
                None => print!(" "),
            }
        }
        println!();
    }
}
