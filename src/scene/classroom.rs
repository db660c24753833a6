//! The classroom, described as a [`Node`] tree.
//!
//! Each object builder returns a group whose origin is the object's reference point
//! (usually the floor point under its centre) and whose parts are unit primitives
//! translated and scaled into place. Order matters: the tree is drawn depth-first
//! and the translucent window panes must come last.

use glam::Vec3;

use crate::color::Color;
use crate::layout::{
    self, ChairId, DOOR_HEIGHT, DOOR_OFFSET, DOOR_WIDTH, FURNITURE_ORIGIN, HEIGHT, LENGTH, WIDTH,
    WINDOW_CENTER_Y, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::scene::graph::{Binding, Material, Node};
use crate::texture::TextureSlot;

const STEEL: Color = Color::rgb8(44, 53, 57);
const CUSHION: Color = Color::rgb8(0, 99, 126);
const LAMINATE: Color = Color::rgb8(207, 218, 209);
const BEECH: Color = Color::rgb8(182, 155, 76);
const BOARD: Color = Color::rgb(1.0, 250.0 / 255.0, 250.0 / 255.0);
const PLATFORM: Color = Color::rgb8(134, 109, 87);
const FLOOR: Color = Color::rgb8(122, 126, 140);
const WALL: Color = Color::rgb8(172, 191, 196);
const PODIUM: Color = Color::rgb8(150, 142, 133);
const DOOR_FRAME: Color = Color::rgb(0.4, 0.4, 0.4);
const LIGHT_DIFFUSER: Color = Color::rgba(0.0, 0.0, 0.0, 0.1);
const LIGHT_SHADE: Color = Color::rgba(0.0, 0.0, 0.0, 0.6);
const GLASS: Color = Color::rgba(1.0, 1.0, 1.0, 0.25);

/// Seating grid spacing.
const BANK_OFFSETS: [f32; 2] = [0.0, 3.0];
const ROW_OFFSETS: [f32; 3] = [0.0, 1.65, 3.3];
const SEAT_OFFSETS: [f32; 3] = [0.0, 0.61, 1.22];

/// A unit cube moved to `at` and stretched to `size`.
fn block(at: Vec3, size: Vec3, material: Material) -> Node {
    Node::group("block")
        .translate(at.x, at.y, at.z)
        .scale(size.x, size.y, size.z)
        .child(Node::cube(material))
}

fn flat(color: Color) -> Material {
    Material::flat(color)
}

fn mirrored() -> [f32; 2] {
    [1.0, -1.0]
}

/// Builds the whole classroom in draw order.
pub fn build() -> Node {
    let centre = layout::room_center();
    Node::group("classroom")
        .child(furniture())
        .child(
            Node::group("room")
                .translate(centre.x, centre.y, centre.z)
                .child(shell())
                .child(whiteboard(-1.65, 1.2, 2))
                .child(whiteboard(0.0, 1.5, 1))
                .child(whiteboard(1.65, 1.2, 0))
                .child(platform())
                .child(lectern())
                .child(light(0.0, 0.0))
                .child(light(0.0, LENGTH / 4.0))
                .child(light(0.0, -LENGTH / 4.0))
                .child(window_wall()),
        )
}

/// Two banks of three rows of three chairs, each with a table in front.
fn furniture() -> Node {
    let mut grid = Node::group("furniture").translate(
        FURNITURE_ORIGIN.x,
        FURNITURE_ORIGIN.y,
        FURNITURE_ORIGIN.z,
    );
    let mut chairs = ChairId::all();
    for bank in BANK_OFFSETS {
        for row in ROW_OFFSETS {
            for seat in SEAT_OFFSETS {
                let Some(id) = chairs.next() else {
                    return grid;
                };
                grid = grid
                    .child(chair(id, seat + bank, row))
                    .child(table(seat + bank, row + 0.2));
            }
        }
    }
    grid
}

/// A chair whose seat centre sits above `(x, 0, z)` when tucked in.
fn chair(id: ChairId, x: f32, z: f32) -> Node {
    let mut chair = Node::group("chair")
        .translate(x, 0.0, z)
        .animated(Binding::ChairTuck(id))
        .child(Node::Probe(id));
    for sign in mirrored() {
        chair = chair
            .child(block(
                Vec3::new(sign * 0.18, 0.27, -0.215),
                Vec3::new(0.02, 0.54, 0.02),
                flat(STEEL),
            ))
            .child(block(
                Vec3::new(sign * 0.18, 0.2, 0.185),
                Vec3::new(0.02, 0.4, 0.02),
                flat(STEEL),
            ));
    }
    let fabric = Material::textured(CUSHION, TextureSlot::Fabric);
    chair
        .child(block(Vec3::new(0.0, 0.43, 0.0), Vec3::new(0.48, 0.06, 0.41), fabric))
        .child(block(Vec3::new(0.0, 0.69, -0.215), Vec3::new(0.48, 0.3, 0.06), fabric))
}

fn table(x: f32, z: f32) -> Node {
    let frame = (0..4).map(|quarter| {
        Node::group("table frame")
            .rotate(quarter as f32 * 90.0, Vec3::Y)
            .child(block(
                Vec3::new(0.29, 0.35, 0.29),
                Vec3::new(0.02, 0.7, 0.02),
                flat(STEEL),
            ))
            .child(block(
                Vec3::new(0.29, 0.69, 0.0),
                Vec3::new(0.02, 0.02, 0.56),
                flat(STEEL),
            ))
    });
    Node::group("table")
        .translate(x, 0.0, z)
        .children(frame)
        .child(block(
            Vec3::new(0.0, 0.72, 0.0),
            Vec3::new(0.6, 0.04, 0.6),
            flat(LAMINATE),
        ))
}

/// Floor, ceiling and four walls, with openings for the door and windows.
fn shell() -> Node {
    let mut shell = Node::group("shell");
    for (level, texture) in [(0.0, Some(TextureSlot::Carpet)), (HEIGHT, None)] {
        let material = Material {
            color: FLOOR,
            texture,
        };
        shell = shell.child(block(
            Vec3::new(0.0, level, 0.0),
            Vec3::new(WIDTH, 0.01, LENGTH),
            material,
        ));
    }
    for sign in mirrored() {
        shell = shell.child(block(
            Vec3::new(0.0, HEIGHT / 2.0, sign * LENGTH / 2.0),
            Vec3::new(WIDTH, HEIGHT, 0.01),
            flat(WALL),
        ));
    }

    // Door wall, seen from inside: local -x runs toward the front of the room.
    let lintel_height = HEIGHT - 2.0;
    let door_wall = Node::group("door wall")
        .rotate(90.0, Vec3::Y)
        .translate(0.0, HEIGHT / 2.0, WIDTH / 2.0)
        .child(block(
            Vec3::new(-DOOR_OFFSET, HEIGHT / 2.0 - lintel_height / 2.0, 0.0),
            Vec3::new(0.9, lintel_height, 0.01),
            flat(WALL),
        ))
        .child(block(
            Vec3::new(-2.1 / 2.0 - LENGTH / 4.0, 0.0, 0.0),
            Vec3::new(LENGTH / 2.0 - 2.1, HEIGHT, 0.01),
            flat(WALL),
        ))
        .child(block(
            Vec3::new(LENGTH / 4.0 - 1.2 / 2.0, 0.0, 0.0),
            Vec3::new(LENGTH / 2.0 + 1.2, HEIGHT, 0.01),
            flat(WALL),
        ));

    // Window wall: four pillars between the panes, plus sill and head strips.
    let strip = layout::window_strip_width();
    let band = (HEIGHT - WINDOW_HEIGHT) / 2.0;
    let pillars = (0..4).map(|i| {
        block(
            Vec3::new((LENGTH - strip) * i as f32 / 3.0, 0.0, 0.0),
            Vec3::new(strip, WINDOW_HEIGHT, 0.01),
            flat(WALL),
        )
    });
    let window_wall = Node::group("window wall")
        .rotate(-90.0, Vec3::Y)
        .translate(0.0, 0.0, WIDTH / 2.0)
        .child(
            Node::group("pillars")
                .translate((strip - LENGTH) / 2.0, HEIGHT / 2.0, 0.0)
                .children(pillars),
        )
        .child(block(
            Vec3::new(0.0, band / 2.0, 0.0),
            Vec3::new(LENGTH, band, 0.01),
            flat(WALL),
        ))
        .child(block(
            Vec3::new(0.0, HEIGHT - band / 2.0, 0.0),
            Vec3::new(LENGTH, band, 0.01),
            flat(WALL),
        ));

    shell.child(door_wall).child(window_wall)
}

/// A two-board sliding whiteboard on the front wall. `board` picks the slide
/// offset in scene state.
fn whiteboard(x: f32, width: f32, board: usize) -> Node {
    let mut unit = Node::group("whiteboard").translate(x, 2.0, LENGTH / 2.0 - 0.05);
    for sign in mirrored() {
        unit = unit.child(block(
            Vec3::new(sign * (width / 2.0 + 0.05), 0.0, 0.0),
            Vec3::new(0.1, 1.8, 0.1),
            Material::textured(BEECH, TextureSlot::Beech),
        ));
    }
    for sign in mirrored() {
        unit = unit.child(
            Node::group("board")
                .animated(Binding::BoardSlide { board, sign })
                .scale(width, 2.75 * 0.3, 0.03)
                .child(Node::cube(Material::textured(BOARD, TextureSlot::Whiteboard))),
        );
    }
    unit
}

fn platform() -> Node {
    block(
        Vec3::new(0.0, 0.06, LENGTH / 2.0 - 0.75),
        Vec3::new(WIDTH, 0.12, 1.5),
        Material::textured(PLATFORM, TextureSlot::WoodFloor),
    )
}

fn lectern() -> Node {
    let mut lectern = Node::group("lectern")
        .translate(-0.85, 0.12, LENGTH / 2.0 - 1.23)
        .child(block(
            Vec3::new(0.0, 0.6, -0.25),
            Vec3::new(0.56, 1.2, 0.03),
            Material::textured(PODIUM, TextureSlot::PodiumFront),
        ))
        .child(block(
            Vec3::new(0.0, 0.56, 0.0),
            Vec3::new(0.6, 1.0, 0.03),
            flat(PODIUM),
        ));
    for sign in mirrored() {
        lectern = lectern.child(block(
            Vec3::new(sign * 0.29, 0.6, -0.11),
            Vec3::new(0.02, 1.2, 0.31),
            flat(PODIUM),
        ));
    }
    lectern
        .child(
            Node::group("cover")
                .translate(0.0, 1.200_01, -0.25)
                .scale(0.56, 1.0, 0.03)
                .rotate(90.0, Vec3::X)
                .child(Node::plane(flat(PODIUM))),
        )
        .child(block(
            Vec3::new(0.0, 1.05, -0.11),
            Vec3::new(0.56, 0.04, 0.28),
            flat(LAMINATE),
        ))
}

/// A square ceiling light fixture above floor point `(x, z)`.
fn light(x: f32, z: f32) -> Node {
    const SIZE: f32 = 0.5;
    let mut fixture = Node::group("light")
        .translate(x, HEIGHT - 0.1, z)
        .child(
            Node::group("diffuser")
                .rotate(90.0, Vec3::X)
                .scale(SIZE, SIZE, 1.0)
                .child(Node::plane(flat(LIGHT_DIFFUSER))),
        );
    for sign in mirrored() {
        fixture = fixture
            .child(block(
                Vec3::new(sign * SIZE / 2.0, 0.05, 0.0),
                Vec3::new(0.01, 0.1, SIZE),
                flat(LIGHT_SHADE),
            ))
            .child(block(
                Vec3::new(0.0, 0.05, sign * SIZE / 2.0),
                Vec3::new(SIZE, 0.1, 0.01),
                flat(LIGHT_SHADE),
            ));
    }
    fixture
}

/// Door, blinds and windows, in a frame turned to face the window wall.
///
/// In this frame local `+x` runs toward the front of the room and local `+z`
/// toward the windows.
fn window_wall() -> Node {
    let blind_z = WIDTH / 2.0 - 0.05;
    let pane_x = LENGTH / 2.0 - 1.5;
    Node::group("side walls")
        .rotate(-90.0, Vec3::Y)
        .child(door(DOOR_OFFSET, 1.0, -WIDTH / 2.0))
        .child(blind(-2.7, blind_z, 0))
        .child(blind(0.0, blind_z, 1))
        .child(blind(2.7, blind_z, 2))
        .child(window(pane_x, WIDTH / 2.0))
        .child(window(0.0, WIDTH / 2.0))
        .child(window(-pane_x, WIDTH / 2.0))
}

/// A framed door hinged on its `+x` edge; `(x, y, z)` is the door centre.
fn door(x: f32, y: f32, z: f32) -> Node {
    let mut door = Node::group("door").translate(x, y, z);
    for sign in mirrored() {
        door = door.child(block(
            Vec3::new(sign * (DOOR_WIDTH / 2.0 + 0.03), 0.03, 0.0),
            Vec3::new(0.06, DOOR_HEIGHT + 0.06, 0.1),
            flat(DOOR_FRAME),
        ));
    }
    door.child(block(
        Vec3::new(0.0, DOOR_HEIGHT / 2.0 + 0.03, 0.0),
        Vec3::new(DOOR_WIDTH, 0.06, 0.1),
        flat(DOOR_FRAME),
    ))
    .child(
        Node::group("door leaf")
            .translate(DOOR_WIDTH / 2.0, 0.0, 0.05)
            .animated(Binding::DoorHinge)
            .translate(-DOOR_WIDTH / 2.0, 0.0, -0.03)
            .scale(DOOR_WIDTH, DOOR_HEIGHT, 0.06)
            .child(Node::cube(Material::textured(BEECH, TextureSlot::Door))),
    )
}

/// A roller blind above floor point `(x, z)`; `index` picks its bottom height.
fn blind(x: f32, z: f32, index: usize) -> Node {
    Node::group("blind")
        .translate(x, 0.0, z)
        .child(block(
            Vec3::new(0.0, 2.2, 0.0),
            Vec3::new(2.5, 0.1, 0.1),
            flat(PODIUM),
        ))
        .child(
            Node::group("blind cover")
                .animated(Binding::BlindCover(index))
                .child(Node::cube(flat(PODIUM))),
        )
}

/// A black-framed translucent pane centred at `(x, WINDOW_CENTER_Y, z)`.
fn window(x: f32, z: f32) -> Node {
    let (w, h) = (WINDOW_WIDTH, WINDOW_HEIGHT);
    let mut window = Node::group("window").translate(x, WINDOW_CENTER_Y, z);
    for sign in mirrored() {
        window = window
            .child(
                Node::group("window rail")
                    .translate(0.0, sign * h / 2.0, 0.0)
                    .rotate(90.0, Vec3::Z)
                    .scale(0.045, w + 0.045, 0.1)
                    .child(Node::cube(flat(Color::BLACK))),
            )
            .child(block(
                Vec3::new(sign * w / 2.0, 0.0, 0.0),
                Vec3::new(0.045, h + 0.045, 0.1),
                flat(Color::BLACK),
            ));
    }
    window.child(
        Node::group("pane")
            .scale(w, h, 1.0)
            .child(Node::plane(flat(GLASS))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classroom_has_every_part() {
        let tree = build();
        // 18 chairs × 6, 18 tables × 9, shell 13, boards 12, platform 1,
        // lectern 6, lights 15, door 4, blinds 6, windows 15
        assert_eq!(tree.draw_count(), 342);
        for label in ["furniture", "shell", "lectern", "door leaf", "side walls"] {
            assert!(tree.find(label).is_some(), "missing {label}");
        }
    }

    #[test]
    fn one_probe_per_chair() {
        fn probes(node: &Node, out: &mut Vec<ChairId>) {
            match node {
                Node::Probe(id) => out.push(*id),
                Node::Group { children, .. } => children.iter().for_each(|c| probes(c, out)),
                _ => {}
            }
        }
        let mut found = Vec::new();
        probes(&build(), &mut found);
        assert_eq!(found, ChairId::all().collect::<Vec<_>>());
    }

    #[test]
    fn window_wall_is_drawn_last() {
        let tree = build();
        let Node::Group { children, .. } = tree.find("room").unwrap() else {
            unreachable!();
        };
        let Some(Node::Group { label, children: last, .. }) = children.last() else {
            panic!("room has no children");
        };
        assert_eq!(*label, "side walls");
        assert!(matches!(last.last(), Some(Node::Group { label: "window", .. })));
    }
}
