//! Built-in choices offered by the template designer.

/// Swatches shown in the Colors section.
pub const PRESET_COLORS: [&str; 6] = [
    "#6366F1", "#06B6D4", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6",
];

/// Sample cover images. The first one doubles as the default cover.
pub const SAMPLE_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1520975916090-3105956dac38?q=80&w=1200&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1519681393784-d120267933ba?q=80&w=1200&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1518098268026-4e89f1a2cd8e?q=80&w=1200&auto=format&fit=crop",
];

/// Cover used whenever the template has no image.
pub const DEFAULT_IMAGE_URL: &str = SAMPLE_IMAGES[0];

/// A sound bundled with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSound {
    pub name: &'static str,
    pub url: &'static str,
}

/// Tiny 8 kHz mono WAV beeps embedded as data URIs.
pub const BUILTIN_SOUNDS: [BuiltinSound; 2] = [
    BuiltinSound {
        name: "Chime",
        url: "data:audio/wav;base64,UklGRjQAAABXQVZFZm10IBAAAAABAAEAQB8AAEAfAAABAAgAZGF0YQgAAAAA//8AAP//AAD//wAA//8AAP//AAD//wAA",
    },
    BuiltinSound {
        name: "Ping",
        url: "data:audio/wav;base64,UklGRiQAAABXQVZFZm10IBAAAAABAAEAQB8AAEAfAAABAAgAZGF0YQgAAAAA////AP///wD///8A////AP///wD///8A",
    },
];

/// Sound previewed whenever the template has none.
pub const DEFAULT_SOUND: BuiltinSound = BUILTIN_SOUNDS[0];

/// Position of `url` among the sample images, if it is one.
pub fn sample_image_index(url: &str) -> Option<usize> {
    SAMPLE_IMAGES.iter().position(|sample| *sample == url)
}

/// The built-in sound behind `url`, if any.
pub fn builtin_sound(url: &str) -> Option<&'static BuiltinSound> {
    BUILTIN_SOUNDS.iter().find(|sound| sound.url == url)
}
