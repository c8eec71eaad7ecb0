use super::*;
use crate::foundation::settings::LayerTreeSettings;
use crate::foundation::core::Point;

fn layer(id: i32, x: f64, y: f64, w: f64, h: f64, draws: bool) -> Layer {
    let mut l = Layer::new(LayerId(id));
    l.props.position = Point::new(x, y);
    l.props.bounds = Size::new(w, h);
    l.props.draws_content = draws;
    l
}

fn tree_with_settings(settings: LayerTreeSettings) -> LayerTree {
    let mut tree = LayerTree::new(settings);
    tree.set_device_viewport_size(Size::new(100.0, 100.0));
    tree.set_root_layer(layer(1, 0.0, 0.0, 100.0, 100.0, false));
    tree
}

fn tree() -> LayerTree {
    tree_with_settings(LayerTreeSettings::default())
}

fn dp(tree: &LayerTree, id: i32) -> &DrawProperties {
    tree.layer(LayerId(id)).unwrap().draw_properties()
}

#[test]
fn translated_child_draws_into_the_root_surface() {
    let mut tree = tree();
    tree.add_child(LayerId(1), layer(2, 10.0, 20.0, 30.0, 30.0, true)).unwrap();
    tree.update_draw_properties();

    assert_eq!(tree.render_surface_layer_list(), &[LayerId(1)]);
    let child = dp(&tree, 2);
    assert_eq!(child.target_space_transform.translation(), Vec2::new(10.0, 20.0));
    assert_eq!(child.render_target, Some(LayerId(1)));
    assert_eq!(child.drawable_content_rect, Rect::new(10.0, 20.0, 40.0, 50.0));
    assert_eq!(child.visible_content_rect, Rect::new(0.0, 0.0, 30.0, 30.0));
    assert!(child.is_drawn_member);

    let root = tree.root_layer().unwrap().draw_properties();
    let surface = root.render_surface.as_ref().unwrap();
    assert_eq!(surface.layer_list, vec![LayerId(2)]);
    assert_eq!(surface.content_rect, Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn translucent_layer_with_drawing_descendants_gets_a_surface() {
    let mut tree = tree();
    let mut group = layer(2, 0.0, 0.0, 50.0, 50.0, false);
    group.props.opacity = 0.5;
    tree.add_child(LayerId(1), group).unwrap();
    tree.add_child(LayerId(2), layer(3, 5.0, 5.0, 10.0, 10.0, true)).unwrap();
    tree.update_draw_properties();

    assert_eq!(tree.render_surface_layer_list(), &[LayerId(1), LayerId(2)]);
    let surface = dp(&tree, 2).render_surface.as_ref().unwrap();
    assert_eq!(surface.draw_opacity, 0.5);
    assert_eq!(surface.content_rect, Rect::new(5.0, 5.0, 15.0, 15.0));
    assert_eq!(dp(&tree, 3).render_target, Some(LayerId(2)));
    assert_eq!(dp(&tree, 3).opacity, 1.0);

    let root_list = &dp(&tree, 1).render_surface.as_ref().unwrap().layer_list;
    assert_eq!(root_list, &vec![LayerId(2)]);
}

#[test]
fn translucent_leaf_only_multiplies_opacity() {
    let mut tree = tree();
    let mut leaf = layer(2, 0.0, 0.0, 10.0, 10.0, true);
    leaf.props.opacity = 0.5;
    tree.add_child(LayerId(1), leaf).unwrap();
    tree.update_draw_properties();

    assert_eq!(tree.render_surface_layer_list(), &[LayerId(1)]);
    assert!(!tree.layer(LayerId(2)).unwrap().has_render_surface());
    assert_eq!(dp(&tree, 2).opacity, 0.5);
}

#[test]
fn surface_without_contributors_is_dropped() {
    let mut tree = tree();
    let mut forced = layer(2, 0.0, 0.0, 50.0, 50.0, false);
    forced.props.force_render_surface = true;
    tree.add_child(LayerId(1), forced).unwrap();
    tree.update_draw_properties();

    assert_eq!(tree.render_surface_layer_list(), &[LayerId(1)]);
    assert!(!tree.layer(LayerId(2)).unwrap().has_render_surface());
    assert_eq!(dp(&tree, 2).render_target, Some(LayerId(1)));
}

#[test]
fn invisible_and_back_facing_layers_are_skipped() {
    let mut tree = tree();
    let mut hidden = layer(2, 0.0, 0.0, 10.0, 10.0, true);
    hidden.props.opacity = 0.0;
    let mut flipped = layer(3, 50.0, 0.0, 10.0, 10.0, true);
    flipped.props.double_sided = false;
    flipped.props.transform = Affine::scale_non_uniform(-1.0, 1.0);
    tree.add_child(LayerId(1), hidden).unwrap();
    tree.add_child(LayerId(1), flipped).unwrap();
    tree.add_child(LayerId(2), layer(4, 0.0, 0.0, 10.0, 10.0, true)).unwrap();
    tree.update_draw_properties();

    for id in [2, 3, 4] {
        assert!(!dp(&tree, id).is_drawn_member, "layer {id} should not draw");
    }
    assert!(dp(&tree, 1).render_surface.as_ref().unwrap().layer_list.is_empty());
}

#[test]
fn opacity_animation_keeps_a_transparent_layer_in_the_pass() {
    let mut tree = tree();
    let mut fading = layer(2, 0.0, 0.0, 10.0, 10.0, true);
    fading.props.opacity = 0.0;
    fading.props.opacity_is_animating = true;
    tree.add_child(LayerId(1), fading).unwrap();
    tree.update_draw_properties();

    assert!(dp(&tree, 2).is_drawn_member);
}

#[test]
fn page_scale_applies_below_the_page_scale_layer() {
    let mut tree = tree();
    tree.add_child(LayerId(1), layer(2, 0.0, 0.0, 100.0, 100.0, false)).unwrap();
    tree.add_child(LayerId(2), layer(3, 10.0, 10.0, 10.0, 10.0, true)).unwrap();
    tree.set_viewport_layer_roles(Some(LayerId(2)), None, None);
    tree.set_page_scale_factor_and_limits(2.0, 1.0, 4.0);
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 3).drawable_content_rect, Rect::new(20.0, 20.0, 40.0, 40.0));
    // The page-scale layer itself is not scaled.
    assert_eq!(dp(&tree, 2).target_space_transform, Affine::IDENTITY);
}

#[test]
fn device_scale_maps_layer_space_to_pixels() {
    let mut tree = tree();
    tree.set_device_viewport_size(Size::new(200.0, 200.0));
    tree.set_device_scale_factor(2.0);
    tree.add_child(LayerId(1), layer(2, 5.0, 5.0, 10.0, 10.0, true)).unwrap();
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 2).drawable_content_rect, Rect::new(10.0, 10.0, 30.0, 30.0));
    assert_eq!(dp(&tree, 2).contents_scale, 1.0);
}

#[test]
fn scaling_transforms_raise_contents_scale_when_allowed() {
    let settings = LayerTreeSettings {
        layer_transforms_should_scale_layer_contents: true,
        ..LayerTreeSettings::default()
    };
    let mut tree = tree_with_settings(settings);
    let mut zoomed = layer(2, 0.0, 0.0, 10.0, 15.0, true);
    zoomed.props.transform = Affine::scale(2.0);
    tree.add_child(LayerId(1), zoomed).unwrap();
    tree.update_draw_properties();

    let d = dp(&tree, 2);
    assert_eq!(d.contents_scale, 2.0);
    assert_eq!(d.content_bounds, Size::new(20.0, 30.0));
    assert_eq!(d.drawable_content_rect, Rect::new(0.0, 0.0, 20.0, 30.0));
}

/// Root 1 > clip 2 > scroller 3 (scroll clip 2) > child 4.
fn scrolled_tree(delta: Vec2) -> LayerTree {
    let mut tree = tree();
    tree.add_child(LayerId(1), layer(2, 0.0, 0.0, 100.0, 100.0, false)).unwrap();
    let mut scroller = layer(3, 0.0, 0.0, 100.0, 300.0, false);
    scroller.props.scroll_clip_layer = Some(LayerId(2));
    tree.add_child(LayerId(2), scroller).unwrap();
    tree.add_child(LayerId(3), layer(4, 0.0, 50.0, 10.0, 10.0, true)).unwrap();
    tree.set_scroll_delta(LayerId(3), delta).unwrap();
    tree
}

#[test]
fn scroll_delta_moves_the_scrolled_contents() {
    let mut tree = scrolled_tree(Vec2::new(0.0, 30.0));
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 4).target_space_transform.translation(), Vec2::new(0.0, 20.0));
    assert!(dp(&tree, 3).scrolls_drawn_descendant);
    assert!(!dp(&tree, 2).scrolls_drawn_descendant);
}

#[test]
fn scroll_child_follows_a_non_ancestor_scroll_parent() {
    let mut tree = scrolled_tree(Vec2::new(0.0, 30.0));
    let mut follower = layer(5, 20.0, 50.0, 10.0, 10.0, true);
    follower.props.scroll_parent = Some(LayerId(3));
    tree.add_child(LayerId(1), follower).unwrap();
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 5).target_space_transform.translation(), Vec2::new(20.0, 20.0));
}

#[test]
fn fixed_position_layer_ignores_ancestor_scrolling() {
    let mut tree = scrolled_tree(Vec2::new(0.0, 30.0));
    let mut fixed = layer(5, 5.0, 5.0, 10.0, 10.0, true);
    fixed.props.position_constraint.is_fixed_position = true;
    tree.add_child(LayerId(3), fixed).unwrap();
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 5).target_space_transform.translation(), Vec2::new(5.0, 5.0));
}

#[test]
fn masks_to_bounds_clips_descendants() {
    let mut tree = tree();
    let mut clip = layer(2, 10.0, 10.0, 20.0, 20.0, false);
    clip.props.masks_to_bounds = true;
    tree.add_child(LayerId(1), clip).unwrap();
    tree.add_child(LayerId(2), layer(3, 0.0, 0.0, 80.0, 80.0, true)).unwrap();
    tree.update_draw_properties();

    let d = dp(&tree, 3);
    assert!(d.is_clipped);
    assert_eq!(d.clip_rect, Rect::new(10.0, 10.0, 30.0, 30.0));
    assert_eq!(d.drawable_content_rect, Rect::new(10.0, 10.0, 30.0, 30.0));
    assert_eq!(d.visible_content_rect, Rect::new(0.0, 0.0, 20.0, 20.0));
}

#[test]
fn committed_offset_and_delta_both_move_the_contents() {
    let mut tree = scrolled_tree(Vec2::new(0.0, 5.0));
    tree.set_scroll_offset(LayerId(3), Vec2::new(0.0, 30.0)).unwrap();
    tree.update_draw_properties();

    let d = dp(&tree, 4);
    assert_eq!(d.target_space_transform.translation(), Vec2::new(0.0, 15.0));
    assert_eq!(d.screen_space_transform.translation(), Vec2::new(0.0, 15.0));
    assert_eq!(dp(&tree, 3).screen_space_transform.translation(), Vec2::new(0.0, -35.0));
}

#[test]
fn fixed_position_undoes_only_the_impl_side_delta() {
    // The producer already placed the fixed layer for the committed 30px.
    let mut tree = scrolled_tree(Vec2::new(0.0, 5.0));
    tree.set_scroll_offset(LayerId(3), Vec2::new(0.0, 30.0)).unwrap();
    let mut fixed = layer(5, 5.0, 35.0, 10.0, 10.0, true);
    fixed.props.position_constraint.is_fixed_position = true;
    tree.add_child(LayerId(3), fixed).unwrap();
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 5).target_space_transform.translation(), Vec2::new(5.0, 5.0));
}

#[test]
fn scroll_child_follows_only_the_scroll_parent_delta() {
    let mut tree = scrolled_tree(Vec2::new(0.0, 30.0));
    tree.set_scroll_offset(LayerId(3), Vec2::new(0.0, 40.0)).unwrap();
    let mut follower = layer(5, 20.0, 50.0, 10.0, 10.0, true);
    follower.props.scroll_parent = Some(LayerId(3));
    tree.add_child(LayerId(1), follower).unwrap();
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 5).target_space_transform.translation(), Vec2::new(20.0, 20.0));
}

#[test]
fn singular_ancestor_hides_the_subtree_but_still_walks_it() {
    let mut tree = tree();
    let mut flat = layer(2, 10.0, 10.0, 50.0, 50.0, true);
    flat.props.transform = Affine::scale(0.0);
    tree.add_child(LayerId(1), flat).unwrap();
    tree.add_child(LayerId(2), layer(3, 0.0, 0.0, 20.0, 20.0, true)).unwrap();
    let mut grandchild = layer(4, 5.0, 5.0, 10.0, 10.0, true);
    grandchild.props.transform = Affine::scale(3.0);
    tree.add_child(LayerId(3), grandchild).unwrap();
    tree.update_draw_properties();

    for id in [2, 3, 4] {
        let d = dp(&tree, id);
        assert_eq!(d.visible_content_rect, Rect::ZERO, "layer {id}");
        assert!(!d.is_drawn_member, "layer {id}");
        assert_eq!(d.render_target, Some(LayerId(1)), "layer {id} was not walked");
    }
    assert!(dp(&tree, 1).render_surface.as_ref().unwrap().layer_list.is_empty());
}

#[test]
fn page_scale_is_applied_once_at_the_page_scale_layer() {
    let mut tree = tree();
    tree.add_child(LayerId(1), layer(2, 10.0, 10.0, 90.0, 90.0, false)).unwrap();
    tree.add_child(LayerId(2), layer(3, 0.0, 0.0, 50.0, 50.0, true)).unwrap();
    tree.add_child(LayerId(3), layer(4, 5.0, 5.0, 20.0, 20.0, false)).unwrap();
    tree.add_child(LayerId(4), layer(5, 5.0, 5.0, 10.0, 10.0, true)).unwrap();
    tree.set_viewport_layer_roles(Some(LayerId(3)), None, None);
    tree.set_page_scale_factor_and_limits(2.0, 1.0, 4.0);
    tree.update_draw_properties();

    assert_eq!(dp(&tree, 2).target_space_transform, Affine::translate((10.0, 10.0)));
    assert_eq!(dp(&tree, 3).target_space_transform, Affine::translate((10.0, 10.0)));
    assert_eq!(
        dp(&tree, 4).target_space_transform,
        Affine::translate((20.0, 20.0)) * Affine::scale(2.0)
    );
    let grandchild = dp(&tree, 5);
    assert_eq!(
        grandchild.target_space_transform,
        Affine::translate((30.0, 30.0)) * Affine::scale(2.0)
    );
    assert_eq!(grandchild.drawable_content_rect, Rect::new(30.0, 30.0, 50.0, 50.0));
}
