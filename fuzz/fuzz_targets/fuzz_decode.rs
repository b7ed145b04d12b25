#![no_main]
use libfuzzer_sys::fuzz_target;
use zentexture::{FloatCanvas, Limits, TextureContainer};

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        max_layers: Some(64),
        ..Default::default()
    };

    // Slice and stream readers must agree and never panic
    let parsed = TextureContainer::from_bytes_with_limits(data, &limits);
    let streamed = TextureContainer::read_from_with_limits(data, &limits);
    if let Ok(container) = &parsed {
        assert_eq!(streamed.as_ref().ok(), Some(container));
        for layer in container {
            let canvas = FloatCanvas::from_layer(layer).expect("validated layer unpacks");
            assert_eq!(canvas.pixel_count(), (layer.width() * layer.height()) as usize);
        }
    }
});
