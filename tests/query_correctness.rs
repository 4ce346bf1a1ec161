use cell_ecs::prelude::*;
use glam::Vec2;
use std::collections::BTreeSet;

/// Deterministic mix of components over `count` entities
fn populate(world: &mut World, count: u32) -> (Tag, Vec<EntityId>, Vec<ComponentId>) {
    let alive = world.tag();
    let food = world.tag();
    let player = world.tag();
    let mass = world.component::<f32>();
    let position = world.component::<Vec2>();
    let all = vec![food.id(), player.id(), mass.id(), position.id()];

    let entities = (0..count)
        .map(|i| {
            let e = world.create();
            world.add(e, alive).unwrap();
            if i % 2 == 0 {
                world.set(e, mass, i as f32).unwrap();
            }
            if i % 3 == 0 {
                world.set(e, position, Vec2::splat(i as f32)).unwrap();
            }
            if i % 5 == 0 {
                world.add(e, player).unwrap();
            } else if i % 7 == 0 {
                world.add(e, food).unwrap();
            }
            e
        })
        .collect();
    (alive, entities, all)
}

#[test]
fn test_query_matches_brute_force() {
    let mut world = World::new();
    let (alive, entities, all) = populate(&mut world, 200);
    let (food, player, mass, position) = (all[0], all[1], all[2], all[3]);

    let filters: Vec<Vec<ComponentId>> = vec![
        vec![mass],
        vec![position, player],
        vec![food, mass],
        vec![mass, position, player],
    ];

    for filter in filters {
        let expected: BTreeSet<EntityId> = entities
            .iter()
            .copied()
            .filter(|&e| filter.iter().all(|&c| world.has(e, c)))
            .collect();

        let found: BTreeSet<EntityId> = world
            .query(alive)
            .with(filter.as_slice())
            .entities()
            .into_iter()
            .collect();
        assert_eq!(found, expected);
    }
}

#[test]
fn test_typed_query_matches_brute_force() {
    let mut world = World::new();
    let food = world.tag();
    let player = world.tag();
    let mass = world.component::<f32>();
    let position = world.component::<Vec2>();

    let mut expected = BTreeSet::new();
    for i in 0..100u32 {
        let e = world.create();
        world.set(e, position, Vec2::new(i as f32, 1.0)).unwrap();
        if i % 4 != 0 {
            world.set(e, mass, 1.0).unwrap();
        }
        if i % 3 == 0 {
            world.add(e, player).unwrap();
            if i % 4 != 0 {
                expected.insert(e);
            }
        } else {
            world.add(e, food).unwrap();
        }
    }

    let found: BTreeSet<EntityId> = world
        .query((mass, position))
        .with(player)
        .iter()
        .map(|(e, _, _)| e)
        .collect();
    assert_eq!(found, expected);

    for (e, m, p) in world.query((mass, position)).with(player).iter() {
        assert_eq!(world.get(e, mass), m);
        assert_eq!(world.get(e, position), p);
    }
}

#[test]
fn test_players_with_position() -> Result<()> {
    let mut world = World::new();
    let player = world.tag();
    let position = world.component::<Vec2>();

    let walker = world.create();
    world.add(walker, player)?;
    world.set(walker, position, Vec2::new(1.0, 2.0))?;

    let spectator = world.create();
    world.add(spectator, player)?;

    let rows: Vec<_> = world.query(player).with(position).iter().collect();
    assert_eq!(rows, vec![(walker, Present)]);
    Ok(())
}

#[test]
fn test_query_restart_sees_new_state() -> Result<()> {
    let mut world = World::new();
    let mass = world.component::<u32>();
    let e = world.create();
    world.set(e, mass, 1)?;
    assert_eq!(world.query(mass).count(), 1);

    let other = world.create();
    world.set(other, mass, 2)?;
    assert_eq!(world.query(mass).count(), 2);
    Ok(())
}

#[test]
fn test_tag_only_world_has_no_column_storage() -> Result<()> {
    let mut world = World::new();
    let tags: Vec<Tag> = (0..3).map(|_| world.tag()).collect();
    for i in 0..6 {
        let e = world.create();
        for (t, &tag) in tags.iter().enumerate() {
            if (i >> t) & 1 == 1 {
                world.add(e, tag)?;
            }
        }
    }

    let mut tag_columns = 0;
    for archetype in world.archetypes() {
        for column in archetype.columns() {
            let tag = column.as_tag().expect("only tags registered");
            assert!(std::ptr::eq(tag, &TAG_COLUMN));
            assert_eq!(column.storage_len(), 0);
            tag_columns += 1;
        }
    }
    assert!(tag_columns > 0);
    Ok(())
}
