//! Integration tests for ray picking against the scene.

use glam::Vec3;
use mesh_scene_lib::fixtures::*;
use mesh_scene_lib::state::scene::SceneRegistry;
use shared::{Primitive, Transform};

/// Unit cubes whose near faces sit 5, 2 and 8 units along +Z from the ray origin
fn three_cubes() -> (SceneRegistry, Vec<String>) {
    let mut r = SceneRegistry::default();
    let ids = [("far", 5.5), ("near", 2.5), ("farthest", 8.5)]
        .iter()
        .map(|(name, z)| r.create_object(cube_desc_at(name, 1.0, [0.0, 0.0, *z])).id().clone())
        .collect();
    (r, ids)
}

const ORIGIN: Vec3 = Vec3::new(0.1, 0.2, 0.0);

#[test]
fn test_nearest_of_several_hits() {
    let (r, ids) = three_cubes();

    let hit = r.find_nearest_hit(ORIGIN, Vec3::Z, 10.0).unwrap();
    assert_eq!(hit.object.id(), &ids[1]);
    assert!((hit.distance - 2.0).abs() < 1e-5);
    assert!((hit.world_point - Vec3::new(0.1, 0.2, 2.0)).length() < 1e-5);
}

#[test]
fn test_max_distance_excludes_everything() {
    let (r, _) = three_cubes();
    assert!(r.find_nearest_hit(ORIGIN, Vec3::Z, 1.0).is_none());
}

#[test]
fn test_max_distance_between_hits() {
    let (r, ids) = three_cubes();
    let hit = r.find_nearest_hit(ORIGIN, Vec3::Z, 6.0).unwrap();
    assert_eq!(hit.object.id(), &ids[1]);

    // Only the near cube lies within range once it is gone
    let mut r = r;
    let near = r.find(&ids[1]).cloned().unwrap();
    r.delete_object(&near);
    let hit = r.find_nearest_hit(ORIGIN, Vec3::Z, 6.0).unwrap();
    assert_eq!(hit.object.id(), &ids[0]);
}

#[test]
fn test_ray_pointing_away_misses() {
    let (r, _) = three_cubes();
    assert!(r.find_nearest_hit(ORIGIN, -Vec3::Z, 100.0).is_none());
}

#[test]
fn test_unnormalized_direction() {
    let (r, ids) = three_cubes();
    let hit = r.find_nearest_hit(ORIGIN, Vec3::new(0.0, 0.0, 5.0), 10.0).unwrap();
    assert_eq!(hit.object.id(), &ids[1]);
    assert!((hit.distance - 2.0).abs() < 1e-5);
}

#[test]
fn test_pick_honours_object_transform() {
    let mut r = SceneRegistry::default();
    let mesh = mesh_scene_lib::viewport::mesh::MeshData::from_primitive(&Primitive::Sphere { radius: 1.0 });
    let sphere = r.create_object(
        mesh_scene_lib::state::scene::SceneObjectDesc::new("ball", mesh).with_transform(Transform {
            position: [10.0, 0.0, 0.0],
            rotation: [0.0; 3],
            scale: [2.0; 3],
        }),
    );

    let hit = r
        .find_nearest_hit(Vec3::new(10.13, 0.05, -10.0), Vec3::Z, 100.0)
        .unwrap();
    assert!(std::rc::Rc::ptr_eq(&hit.object, &sphere));
    // Tessellated sphere of radius 2: the surface is slightly inside the true sphere
    assert!(hit.distance > 8.0 && hit.distance < 8.2);
    let b = hit.bary_coords;
    assert!((b.x + b.y + b.z - 1.0).abs() < 1e-4);
}

#[test]
fn test_tie_winner_survives_delete_and_undo() {
    let mut r = SceneRegistry::default();
    let history = std::rc::Rc::new(std::cell::RefCell::new(
        mesh_scene_lib::state::scene::UndoHistory::default(),
    ));
    r.set_transactions(Some(history.clone()));
    let a = r.create_object(cube_desc_at("a", 1.0, [0.0, 0.0, 3.5]));
    r.create_object(cube_desc_at("b", 1.0, [0.0, 0.0, 3.5]));

    let winner = |r: &SceneRegistry| r.find_nearest_hit(ORIGIN, Vec3::Z, 10.0).unwrap().object;
    assert!(std::rc::Rc::ptr_eq(&winner(&r), &a));

    r.delete_object(&a);
    assert!(history.borrow_mut().undo(&mut r));
    assert!(std::rc::Rc::ptr_eq(&winner(&r), &a));
}
