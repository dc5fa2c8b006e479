//! # Entity Manager Integration Test
//!
//! Exercises queries, attachment, duplication and prefabs through the public
//! API only.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::{EntityId, EntityManager};

#[derive(Clone, Debug, Default, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Color {
    #[default]
    Black,
    Red,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Label(u32);

tessera_core::universe! {
    struct Motion { Position, Velocity, Color, Label }
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

/// Test: The integration step and late attachment walkthrough.
#[test]
fn test_move_then_colour_one_entity() {
    let mut em = EntityManager::<Motion>::new();
    let batch = em.create_entities::<(Position, Velocity)>(3, |i, _, (pos, vel)| {
        pos.x = i as f32;
        vel.x = 1.0;
    });
    let ids: Vec<EntityId> = batch.collect();

    let dt = 1.0;
    em.for_all_components::<(Position, Velocity)>(|(pos, vel)| {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
    });
    for (i, &id) in ids.iter().enumerate() {
        let pos = em.component::<Position>(id);
        assert!(close(pos.x, i as f32 + 1.0) && close(pos.y, 0.0));
    }

    em.attach_components::<(Color,)>(ids[1], |(color,)| *color = Color::Red);

    let mut visited = Vec::new();
    em.for_all_components_with_id::<(Position, Color)>(|id, (pos, color)| {
        visited.push((id, pos.clone(), *color));
    });
    assert_eq!(visited, vec![(ids[1], Position { x: 2.0, y: 0.0 }, Color::Red)]);
}

/// Test: Every ordered subset of the creation set visits every entity once.
#[test]
fn test_subset_queries_visit_each_entity_once() {
    let mut em = EntityManager::<Motion>::new();
    em.create_entities::<(Position, Velocity, Label)>(5, |i, _, (pos, vel, label)| {
        pos.x = i as f32;
        vel.y = -(i as f32);
        label.0 = u32::try_from(i).expect("small");
    });

    let mut labels = Vec::new();
    em.for_all_components::<(Label,)>(|(label,)| labels.push(label.0));
    assert_eq!(labels, vec![0, 1, 2, 3, 4]);

    let mut pairs = 0;
    em.for_all_components::<(Position, Label)>(|(pos, label)| {
        assert!(close(pos.x, label.0 as f32));
        pairs += 1;
    });
    assert_eq!(pairs, 5);

    let mut triples = 0;
    em.for_all_components::<(Position, Velocity, Label)>(|(pos, vel, label)| {
        assert!(close(pos.x, -vel.y));
        assert!(close(pos.x, label.0 as f32));
        triples += 1;
    });
    assert_eq!(triples, 5);
}

/// Test: Queries never visit entities lacking a listed type.
#[test]
fn test_queries_exclude_missing_components() {
    let mut em = EntityManager::<Motion>::new();
    em.create_entities::<(Position,)>(4, |_, _, _| {});
    em.create_entities::<(Position, Velocity)>(2, |_, _, _| {});
    em.create_entities::<(Velocity, Color)>(3, |_, _, _| {});

    assert_eq!(em.count_matching::<(Position,)>(), 6);
    assert_eq!(em.count_matching::<(Velocity,)>(), 5);
    assert_eq!(em.count_matching::<(Position, Velocity)>(), 2);
    assert_eq!(em.count_matching::<(Velocity, Color)>(), 3);
    assert_eq!(em.count_matching::<(Position, Color)>(), 0);

    let mut visited = Vec::new();
    em.for_all_components_with_id::<(Position, Velocity)>(|id, _| visited.push(id.index()));
    assert_eq!(visited, vec![4, 5]);
}

/// Expected slot list of `id`: its recorded slot per type, in type order.
fn slots_in_type_order(
    em: &EntityManager<Motion>,
    id: EntityId,
    by_type: &[usize; 4],
) -> Vec<usize> {
    em.entity(id)
        .type_indices()
        .map(|t| by_type[usize::from(t)])
        .collect()
}

/// Slot just created for the type at `index`.
fn last_slot(em: &EntityManager<Motion>, index: u8) -> usize {
    em.storage().len_by_index(index) - 1
}

/// Test: Attaching in either order resolves to the same components.
#[test]
fn test_attachment_order_is_irrelevant() {
    let mut em = EntityManager::<Motion>::new();
    // Uneven column lengths so slot numbers differ per type
    em.create_entities::<(Velocity,)>(2, |_, _, _| {});
    em.create_entities::<(Label,)>(5, |_, _, _| {});

    let a = em
        .create_entities::<(Position,)>(1, |_, _, (pos,)| pos.x = 1.0)
        .first()
        .expect("created");
    em.attach_components::<(Label,)>(a, |(label,)| label.0 = 11);
    em.attach_components::<(Velocity,)>(a, |(vel,)| vel.x = 2.0);

    let b = em
        .create_entities::<(Label,)>(1, |_, _, (label,)| label.0 = 22)
        .first()
        .expect("created");
    em.attach_components::<(Velocity,)>(b, |(vel,)| vel.x = 4.0);
    em.attach_components::<(Position,)>(b, |(pos,)| pos.x = 3.0);

    assert_eq!(em.entity(a).mask(), em.entity(b).mask());
    assert_eq!(em.entity(a).slots(), &[0, 2, 5]);
    assert_eq!(em.entity(b).slots(), &[1, 3, 6]);

    let mut seen = Vec::new();
    em.for_all_components::<(Position, Velocity, Label)>(|(pos, vel, label)| {
        seen.push((pos.x, vel.x, label.0));
    });
    assert_eq!(seen, vec![(1.0, 2.0, 11), (3.0, 4.0, 22)]);
}

/// Test: A multi-type attach interleaves with the types already present.
#[test]
fn test_interleaved_attach_merges_slots() {
    let mut em = EntityManager::<Motion>::new();
    em.create_entities::<(Position,)>(7, |_, _, _| {});
    em.create_entities::<(Velocity,)>(3, |_, _, _| {});
    em.create_entities::<(Color,)>(5, |_, _, _| {});

    let id = em
        .create_entities::<(Velocity, Label)>(1, |_, _, (vel, label)| {
            vel.x = 2.0;
            label.0 = 42;
        })
        .first()
        .expect("created");
    assert_eq!(em.entity(id).slots(), &[3, 0]);

    em.attach_components::<(Position, Color)>(id, |(pos, color)| {
        pos.x = 1.0;
        *color = Color::Red;
    });

    assert_eq!(em.entity(id).type_indices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(em.entity(id).slots(), &[7, 3, 5, 0]);
    assert!(close(em.component::<Position>(id).x, 1.0));
    assert!(close(em.component::<Velocity>(id).x, 2.0));
    assert_eq!(*em.component::<Color>(id), Color::Red);
    assert_eq!(em.component::<Label>(id), &Label(42));

    let mut visits = 0;
    em.for_all_components_with_id::<(Position, Velocity, Color, Label)>(|found, (p, v, c, l)| {
        assert_eq!(found, id);
        assert!(close(p.x, 1.0) && close(v.x, 2.0));
        assert_eq!((*c, l.0), (Color::Red, 42));
        visits += 1;
    });
    assert_eq!(visits, 1);
}

/// Test: Random attach sequences keep the slot list in type order.
#[test]
fn test_random_attach_sequences_stay_sorted() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut em = EntityManager::<Motion>::new();
    em.create_entities::<(Position,)>(3, |_, _, _| {});
    em.create_entities::<(Velocity,)>(7, |_, _, _| {});
    em.create_entities::<(Color,)>(11, |_, _, _| {});
    let mut expected = Vec::new();

    for n in 0..200u32 {
        let id = em
            .create_entities::<(Label,)>(1, |_, _, (label,)| label.0 = n)
            .first()
            .expect("created");
        let mut by_type = [0usize; 4];
        by_type[3] = last_slot(&em, 3);

        // Attach the remaining three types in a random order
        let mut order = [0u8, 1, 2];
        for i in (1..order.len()).rev() {
            order.swap(i, rng.gen_range(0..=i));
        }
        let value = n as f32;
        for step in order {
            match step {
                0 => em.attach_components::<(Position,)>(id, |(p,)| p.x = value),
                1 => em.attach_components::<(Velocity,)>(id, |(v,)| v.y = value),
                _ => em.attach_components::<(Color,)>(id, |(c,)| *c = Color::Red),
            }
            by_type[usize::from(step)] = last_slot(&em, step);

            let want = slots_in_type_order(&em, id, &by_type);
            assert_eq!(em.entity(id).slots(), want.as_slice(), "entity {n}");
        }
        expected.push(n);

        assert_eq!(em.entity(id).slots().len(), 4);
        assert!(close(em.component::<Position>(id).x, value));
        assert!(close(em.component::<Velocity>(id).y, value));
    }

    let mut seen = Vec::new();
    em.for_all_components::<(Position, Velocity, Color, Label)>(|(p, v, c, label)| {
        assert!(close(p.x, label.0 as f32));
        assert!(close(v.y, label.0 as f32));
        assert_eq!(*c, Color::Red);
        seen.push(label.0);
    });
    assert_eq!(seen, expected);
}

/// Test: A duplicate shares no storage with its source.
#[test]
fn test_duplicate_is_independent() {
    let mut em = EntityManager::<Motion>::new();
    let source = em
        .create_entities::<(Position, Label)>(1, |_, _, (pos, label)| {
            pos.x = 5.0;
            label.0 = 9;
        })
        .first()
        .expect("created");

    let copy = em.duplicate_entity(source);
    em.for_components::<(Position, Label)>(copy, |(pos, label)| {
        pos.x = -5.0;
        label.0 = 10;
    });
    assert_eq!(em.component::<Label>(source), &Label(9));
    assert!(close(em.component::<Position>(source).x, 5.0));

    em.component_mut::<Label>(source).0 = 1;
    assert_eq!(em.component::<Label>(copy), &Label(10));
}

/// Test: Prefabs are hidden from bulk queries but usable as templates.
#[test]
fn test_prefabs_are_templates() {
    let mut em = EntityManager::<Motion>::new();
    em.set_prefabbing(true);
    let template = em
        .create_entities::<(Position, Velocity)>(1, |_, _, (_, vel)| vel.x = 3.0)
        .first()
        .expect("created");
    em.set_prefabbing(false);

    assert!(em.is_prefab(template));
    assert_eq!(em.count_matching::<(Position, Velocity)>(), 0);

    let mut visits = 0;
    em.for_all_components::<(Velocity,)>(|_| visits += 1);
    assert_eq!(visits, 0);

    em.for_components::<(Velocity,)>(template, |(vel,)| vel.y = 1.0);
    assert!(close(em.component::<Velocity>(template).y, 1.0));

    let live = em.duplicate_entity(template);
    assert!(!em.is_prefab(live));
    let mut seen = Vec::new();
    em.for_all_components_with_id::<(Velocity,)>(|id, (vel,)| seen.push((id, vel.x, vel.y)));
    assert_eq!(seen, vec![(live, 3.0, 1.0)]);
}

/// Test: Duplicating while prefabbing yields another prefab.
#[test]
fn test_duplicate_takes_current_prefab_mode() {
    let mut em = EntityManager::<Motion>::new();
    let live = em
        .create_entities::<(Label,)>(1, |_, _, _| {})
        .first()
        .expect("created");

    em.set_prefabbing(true);
    let template = em.duplicate_entity(live);
    assert!(em.is_prefab(template));
    assert!(!em.is_prefab(live));
    assert_eq!(em.count_matching::<(Label,)>(), 1);
}

/// Test: The extra argument reaches the single-entity callback.
#[test]
fn test_for_components_with_extra_argument() {
    let mut em = EntityManager::<Motion>::new();
    let id = em
        .create_entities::<(Position,)>(1, |_, _, _| {})
        .first()
        .expect("created");

    let target = Position { x: 8.0, y: -8.0 };
    em.for_components_with::<(Position,), _>(id, &target, |target, (pos,)| {
        *pos = target.clone();
    });
    assert_eq!(em.component::<Position>(id), &target);
}

/// Test: Empty batches create nothing.
#[test]
fn test_empty_batch() {
    let mut em = EntityManager::<Motion>::new();
    let mut calls = 0;
    let batch = em.create_entities::<(Position,)>(0, |_, _, _| calls += 1);
    assert_eq!(batch.len(), 0);
    assert_eq!(calls, 0);
    assert!(em.is_empty());
}
