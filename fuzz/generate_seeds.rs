#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn layer(level: i32, w: i32, h: i32, format: u32, storage: u32, pixels: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in [level, w, h] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&format.to_le_bytes());
    out.extend_from_slice(&storage.to_le_bytes());
    out.extend_from_slice(pixels);
    out
}

fn container(layers: &[Vec<u8>]) -> Vec<u8> {
    let mut out = (layers.len() as u32).to_le_bytes().to_vec();
    for l in layers {
        out.extend_from_slice(l);
    }
    out
}

fn main() {
    use std::fs;
    for dir in ["fuzz/corpus/fuzz_decode", "fuzz/corpus/fuzz_roundtrip"] {
        fs::create_dir_all(dir).unwrap();

        fs::write(format!("{dir}/empty.td"), container(&[])).unwrap();

        // RGB bytes 2x1
        let rgb = layer(0, 2, 1, 0x1907, 0x1401, &[255, 0, 0, 0, 255, 0]);
        fs::write(format!("{dir}/rgb8_2x1.td"), container(&[rgb])).unwrap();

        // 565 2x2 plus its 1x1 mip
        let base = layer(0, 2, 2, 0x1907, 0x8363, &[0x00, 0xF8, 0xE0, 0x07, 0x1F, 0x00, 0xFF, 0xFF]);
        let mip = layer(1, 1, 1, 0x1907, 0x8363, &[0x10, 0x84]);
        fs::write(format!("{dir}/rgb565_chain.td"), container(&[base, mip])).unwrap();

        // 4444 and 5551 1x1
        let rgba4444 = layer(0, 1, 1, 0x1908, 0x8033, &[0x0F, 0xF0]);
        let rgba5551 = layer(0, 1, 1, 0x1908, 0x8034, &[0x01, 0x80]);
        fs::write(format!("{dir}/rgba16.td"), container(&[rgba4444, rgba5551])).unwrap();

        // Luminance-alpha and alpha 1x1
        let la = layer(2, 1, 1, 0x190A, 0x1401, &[128, 64]);
        let a = layer(3, 1, 1, 0x1906, 0x1401, &[7]);
        fs::write(format!("{dir}/la_alpha.td"), container(&[la, a])).unwrap();

        // Truncated/malformed seeds for edge coverage
        fs::write(format!("{dir}/truncated.td"), [2, 0, 0, 0, 0, 0]).unwrap();
        let negative = layer(0, -1, 1, 0x1907, 0x1401, &[]);
        fs::write(format!("{dir}/negative.td"), container(&[negative])).unwrap();
    }
}
