#![no_main]
use libfuzzer_sys::fuzz_target;
use zentexture::*;

fuzz_target!(|data: &[u8]| {
    // If we can parse it, re-serializing must reproduce the input exactly,
    // and unpack/repack of every layer must be stable.
    let Ok(container) = TextureContainer::from_bytes(data) else {
        return;
    };
    assert_eq!(container.to_bytes().unwrap(), data, "container roundtrip mismatch");

    for layer in &container {
        if layer.data().len() > 1 << 20 {
            continue;
        }
        let canvas = FloatCanvas::from_layer(layer).expect("parsed layer unpacks");
        let repacked = PackedLayer::pack(&canvas, layer.format(), layer.level())
            .expect("unpacked canvas repacks");
        assert_eq!(repacked.data(), layer.data(), "pack/unpack mismatch");
    }
});
