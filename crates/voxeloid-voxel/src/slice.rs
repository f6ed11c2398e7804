//! ASCII cross-sections for eyeballing octrees in a terminal.

use glam::Vec3;

/// Draw a `resolution` x `resolution` slice through the plane `z`.
///
/// Samples span `scale * [-1, 1]` on x and y, so a scale above 1 shows the
/// empty margin around the root cube. Solid samples print as `##`.
pub fn render_slice(
    z: f32,
    resolution: usize,
    scale: f32,
    mut is_solid: impl FnMut(Vec3) -> bool,
) -> String {
    let mut out = String::with_capacity(resolution * (2 * resolution + 1));
    for row in 0..resolution {
        for column in 0..resolution {
            let x = 2.0 * column as f32 / resolution as f32 - 1.0;
            let y = 2.0 * row as f32 / resolution as f32 - 1.0;
            let position = Vec3::new(x * scale, y * scale, z);
            out.push_str(if is_solid(position) { "##" } else { "  " });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_dimensions() {
        let slice = render_slice(0.0, 4, 1.0, |_| false);
        assert_eq!(slice.lines().count(), 4);
        assert!(slice.lines().all(|line| line.len() == 8));
    }

    #[test]
    fn slice_marks_solid_half() {
        let slice = render_slice(0.0, 4, 1.0, |p| p.x >= 0.0);
        for line in slice.lines() {
            assert_eq!(line, "    ####");
        }
    }
}
