use cell_ecs::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Name(String);

#[test]
fn test_order_of_adds_does_not_matter() -> Result<()> {
    let mut world = World::new();
    let a = world.tag();
    let b = world.component::<u32>();
    let c = world.tag();

    let first = world.create();
    world.add(first, c)?;
    world.add(first, a)?;
    world.add(first, b)?;

    let second = world.create();
    world.add(second, b)?;
    world.add(second, c)?;
    world.add(second, a)?;

    assert_eq!(
        world.location(first).unwrap().archetype_id,
        world.location(second).unwrap().archetype_id
    );
    assert_eq!(
        world.signature_of(first).unwrap().ids(),
        &[a.id(), b.id(), c.id()]
    );
    Ok(())
}

#[test]
fn test_add_then_remove_returns_to_same_archetype() -> Result<()> {
    let mut world = World::new();
    let mass = world.component::<f32>();
    let food = world.tag();

    let e = world.create();
    world.set(e, mass, 3.0)?;
    let before = world.location(e).unwrap().archetype_id;

    world.add(e, food)?;
    world.remove(e, food)?;

    assert_eq!(world.location(e).unwrap().archetype_id, before);
    assert_eq!(world.get(e, mass), Some(&3.0));
    Ok(())
}

#[test]
fn test_repeated_add_and_remove_are_noops() -> Result<()> {
    let mut world = World::new();
    let food = world.tag();
    let e = world.create();

    world.add(e, food)?;
    let location = world.location(e);
    let archetypes = world.archetype_count();

    world.add(e, food)?;
    assert_eq!(world.location(e), location);
    assert_eq!(world.archetype_count(), archetypes);

    world.remove(e, food)?;
    let location = world.location(e);
    world.remove(e, food)?;
    assert_eq!(world.location(e), location);
    Ok(())
}

#[test]
fn test_migration_keeps_every_shared_value() -> Result<()> {
    let mut world = World::new();
    let mass = world.component::<f32>();
    let name = world.component::<Name>();
    let player = world.tag();
    let untouched = world.component::<u8>();

    let e = world.create();
    world.set(e, mass, 42.0)?;
    world.set(e, name, Name("cell".into()))?;
    world.add(e, untouched)?;

    world.add(e, player)?;
    assert_eq!(world.get(e, mass), Some(&42.0));
    assert_eq!(world.get(e, name), Some(&Name("cell".into())));
    assert_eq!(world.slot(e, untouched)?, ComponentSlot::Uninitialized);

    world.remove(e, mass)?;
    assert_eq!(world.get(e, name), Some(&Name("cell".into())));
    assert!(world.has(e, player));
    assert_eq!(world.slot(e, mass)?, ComponentSlot::Absent);
    Ok(())
}

#[test]
fn test_swap_remove_keeps_neighbours_consistent() -> Result<()> {
    let mut world = World::new();
    let mass = world.component::<u32>();
    let food = world.tag();

    let entities: Vec<_> = (0..5)
        .map(|i| {
            let e = world.create();
            world.set(e, mass, i).unwrap();
            e
        })
        .collect();

    // Leave from the middle: the last row is swapped into its place
    world.add(entities[1], food)?;
    world.delete(entities[2])?;

    for (i, &e) in entities.iter().enumerate() {
        if i == 2 {
            assert!(!world.contains(e));
            continue;
        }
        let location = world.location(e).unwrap();
        let archetype = world.archetype(location.archetype_id).unwrap();
        assert_eq!(archetype.entities()[location.archetype_row], e);
        assert_eq!(world.get(e, mass), Some(&(i as u32)));
    }
    Ok(())
}

#[test]
fn test_identical_migrations_reuse_archetypes() -> Result<()> {
    let mut world = World::new();
    let food = world.tag();
    let mass = world.component::<f32>();

    let first = world.create();
    world.add(first, food)?;
    world.set(first, mass, 1.0)?;
    let archetypes = world.archetype_count();

    for _ in 0..10 {
        let e = world.create();
        world.add(e, food)?;
        world.set(e, mass, 1.0)?;
    }
    assert_eq!(world.archetype_count(), archetypes);
    Ok(())
}

#[test]
fn test_archetype_limit_is_an_error() -> Result<()> {
    let config = WorldConfig {
        max_archetypes: 3,
        ..WorldConfig::default()
    };
    let mut world = World::with_config(ComponentRegistry::new(), config);
    let tags: Vec<_> = (0..4).map(|_| world.tag()).collect();
    let e = world.create();

    world.add(e, tags[0])?;
    world.add(e, tags[1])?;
    assert_eq!(
        world.add(e, tags[2]),
        Err(EcsError::ArchetypeLimitExceeded { limit: 3 })
    );
    // Nothing moved
    assert_eq!(world.signature_of(e).unwrap().len(), 2);
    Ok(())
}
