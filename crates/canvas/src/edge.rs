use gpui::*;
use spatialviz_scene::{ConnectionFrame, ScreenPoint};

const IDLE_COLOR: u32 = 0x323232;
const ACTIVE_COLOR: u32 = 0xff8844;
const ACTIVE_GLOW: u32 = 0xff884460;
const PULSE_COLOR: u32 = 0xffcc88;

const THICKNESS: f32 = 1.5;
const PULSE_RADIUS: f32 = 4.0;

fn to_pixels(origin: Point<Pixels>, p: ScreenPoint) -> Point<Pixels> {
    point(origin.x + px(p.x as f32), origin.y + px(p.y as f32))
}

/// Append a thick line segment to `path` as two triangles.
pub(crate) fn draw_segment(
    path: &mut gpui::Path<Pixels>,
    p1: Point<Pixels>,
    p2: Point<Pixels>,
    half_thickness: f32,
) {
    let dir = point(p2.x - p1.x, p2.y - p1.y);
    let len = dir.magnitude() as f32;
    if len <= 0.0001 {
        return;
    }
    let normal = point(-dir.y, dir.x) * (half_thickness / len);

    let p1a = point(p1.x + normal.x, p1.y + normal.y);
    let p1b = point(p1.x - normal.x, p1.y - normal.y);
    let p2a = point(p2.x + normal.x, p2.y + normal.y);
    let p2b = point(p2.x - normal.x, p2.y - normal.y);

    let st = (point(0., 1.), point(0., 1.), point(0., 1.));
    path.push_triangle((p1a, p1b, p2a), st);
    path.push_triangle((p2a, p1b, p2b), st);
}

/// Paint every connection of a frame relative to `origin`.
pub(crate) fn paint_connections(
    window: &mut Window,
    origin: Point<Pixels>,
    connections: &[ConnectionFrame],
) {
    // Glow underneath active connections
    let mut glow_path = gpui::Path::new(origin);
    for connection in connections.iter().filter(|c| c.active) {
        let p1 = to_pixels(origin, connection.screen_from);
        let p2 = to_pixels(origin, connection.screen_to);
        draw_segment(&mut glow_path, p1, p2, THICKNESS * 4.0);
    }
    window.paint_path(glow_path, rgba(ACTIVE_GLOW));

    let mut idle_path = gpui::Path::new(origin);
    let mut active_path = gpui::Path::new(origin);
    for connection in connections {
        let p1 = to_pixels(origin, connection.screen_from);
        let p2 = to_pixels(origin, connection.screen_to);
        if connection.active {
            draw_segment(&mut active_path, p1, p2, THICKNESS * 2.0);
        } else {
            draw_segment(&mut idle_path, p1, p2, THICKNESS);
        }
    }
    window.paint_path(idle_path, rgb(IDLE_COLOR));
    window.paint_path(active_path, rgb(ACTIVE_COLOR));

    // Flow pulses ride on top
    for pulse in connections.iter().filter_map(|c| c.pulse) {
        let center = to_pixels(origin, pulse.point);
        let bounds = Bounds::new(
            point(center.x - px(PULSE_RADIUS), center.y - px(PULSE_RADIUS)),
            size(px(PULSE_RADIUS * 2.0), px(PULSE_RADIUS * 2.0)),
        );
        window.paint_quad(fill(bounds, rgb(PULSE_COLOR)).corner_radii(px(PULSE_RADIUS)));
    }
}
