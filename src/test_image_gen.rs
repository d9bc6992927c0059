use image::{Rgb, RgbImage};

/// A filled disk in a synthetic scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

impl Disk {
    pub fn new(cx: f32, cy: f32, radius: f32) -> Self {
        Self { cx, cy, radius }
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        let dx = x as f32 - self.cx;
        let dy = y as f32 - self.cy;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Renders `disks` in `fill` on a uniform `background`.
pub fn render_disks(width: u32, height: u32, disks: &[Disk], fill: Rgb<u8>, background: Rgb<u8>) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, background);
    for (x, y, px) in img.enumerate_pixels_mut() {
        if disks.iter().any(|d| d.contains(x, y)) {
            *px = fill;
        }
    }
    img
}

/// White disks on a black background.
pub fn white_disks(width: u32, height: u32, disks: &[Disk]) -> RgbImage {
    render_disks(width, height, disks, Rgb([255, 255, 255]), Rgb([0, 0, 0]))
}

/// Generates a demo scene of off-white "caps" on dark soil and saves it.
pub fn generate_test_image(path: &str) -> Result<(), String> {
    let disks = [
        Disk::new(120.0, 110.0, 45.0),
        Disk::new(300.0, 140.0, 38.0),
        Disk::new(200.0, 300.0, 55.0),
        Disk::new(420.0, 320.0, 30.0),
    ];
    let img = render_disks(520, 420, &disks, Rgb([235, 225, 205]), Rgb([45, 35, 30]));
    img.save(path).map_err(|e| format!("Failed to save image: {}", e))?;
    Ok(())
}
