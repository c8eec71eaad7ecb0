use super::*;
use crate::foundation::core::{Point, Size};
use crate::foundation::settings::LayerTreeSettings;
use crate::layer::layer::Layer;

fn drawn(id: i32, x: f64, y: f64, side: f64) -> Layer {
    let mut l = Layer::new(LayerId(id));
    l.props.position = Point::new(x, y);
    l.props.bounds = Size::new(side, side);
    l.props.draws_content = true;
    l
}

fn tree() -> LayerTree {
    let mut tree = LayerTree::new(LayerTreeSettings::default());
    tree.set_device_viewport_size(Size::new(100.0, 100.0));
    let mut root = Layer::new(LayerId(1));
    root.props.bounds = Size::new(100.0, 100.0);
    tree.set_root_layer(root);
    tree.add_child(LayerId(1), drawn(2, 10.0, 10.0, 20.0)).unwrap();
    tree
}

fn damage_of(tree: &LayerTree, owner: i32) -> Rect {
    tree.layer(LayerId(owner))
        .and_then(|l| l.draw_properties().render_surface.as_ref())
        .map(|s| s.damage_rect)
        .unwrap_or(Rect::ZERO)
}

fn frame(tree: &mut LayerTree) -> Rect {
    tree.update_draw_properties();
    update_damage(tree);
    damage_of(tree, 1)
}

#[test]
fn first_frame_damages_everything_then_nothing() {
    let mut tree = tree();
    assert_eq!(frame(&mut tree), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert!(tree.damage.is_tracking(LayerId(1)));
    assert_eq!(frame(&mut tree), Rect::ZERO);
}

#[test]
fn update_rect_is_damaged_in_target_space() {
    let mut tree = tree();
    frame(&mut tree);
    tree.layer_mut(LayerId(2)).unwrap().props.update_rect = Rect::new(0.0, 0.0, 5.0, 5.0);
    assert_eq!(frame(&mut tree), Rect::new(10.0, 10.0, 15.0, 15.0));
}

#[test]
fn moving_a_layer_damages_old_and_new_footprints() {
    let mut tree = tree();
    frame(&mut tree);
    tree.layer_mut(LayerId(2)).unwrap().props.position = Point::new(30.0, 10.0);
    assert_eq!(frame(&mut tree), Rect::new(10.0, 10.0, 50.0, 30.0));
}

#[test]
fn removed_layer_damages_where_it_was() {
    let mut tree = tree();
    frame(&mut tree);
    tree.remove_layer(LayerId(2)).unwrap();
    tree.set_needs_update_draw_properties();
    assert_eq!(frame(&mut tree), Rect::new(10.0, 10.0, 30.0, 30.0));
}

#[test]
fn explicit_root_damage_is_honoured_once() {
    let mut tree = tree();
    frame(&mut tree);
    tree.damage.add_root_damage(Rect::new(60.0, 60.0, 70.0, 70.0));
    assert_eq!(frame(&mut tree), Rect::new(60.0, 60.0, 70.0, 70.0));
    tree.damage.set_full_root_damage();
    assert_eq!(frame(&mut tree), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(frame(&mut tree), Rect::ZERO);
}

#[test]
fn child_surface_damage_is_mapped_into_the_parent() {
    let mut tree = tree();
    let mut group = Layer::new(LayerId(3));
    group.props.position = Point::new(20.0, 20.0);
    group.props.bounds = Size::new(50.0, 50.0);
    group.props.force_render_surface = true;
    tree.add_child(LayerId(1), group).unwrap();
    tree.add_child(LayerId(3), drawn(4, 0.0, 0.0, 10.0)).unwrap();
    frame(&mut tree);

    tree.layer_mut(LayerId(4)).unwrap().props.update_rect = Rect::new(0.0, 0.0, 5.0, 5.0);
    assert_eq!(frame(&mut tree), Rect::new(20.0, 20.0, 25.0, 25.0));
    assert_eq!(damage_of(&tree, 3), Rect::new(0.0, 0.0, 5.0, 5.0));
}
