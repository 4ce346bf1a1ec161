use cell_ecs::prelude::*;

fn world_with_masses(count: u32) -> (World, Component<u32>, Tag) {
    let mut world = World::new();
    let mass = world.component::<u32>();
    let food = world.tag();
    for i in 0..count {
        let e = world.create();
        world.set(e, mass, i).unwrap();
    }
    (world, mass, food)
}

#[test]
fn test_materialize_then_delete() -> Result<()> {
    let (mut world, mass, _) = world_with_masses(50);

    let small: Vec<EntityId> = world
        .query(mass)
        .iter()
        .filter(|(_, m)| m.is_some_and(|m| *m < 25))
        .map(|(e, _)| e)
        .collect();
    for e in small {
        world.delete(e)?;
    }

    assert_eq!(world.entity_count(), 25);
    assert!(world.query(mass).iter().all(|(_, m)| m.is_some_and(|m| *m >= 25)));
    Ok(())
}

#[test]
fn test_materialize_then_migrate() -> Result<()> {
    let (mut world, mass, food) = world_with_masses(40);

    let everyone = world.query(mass).entities();
    for &e in &everyone {
        world.add(e, food)?;
    }

    assert_eq!(world.query(mass).with(food).count(), 40);
    assert_eq!(world.query(mass).without(food).count(), 0);
    let mut values: Vec<u32> = world.query(mass).iter().filter_map(|(_, m)| m.copied()).collect();
    values.sort_unstable();
    assert_eq!(values, (0..40).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_deferred_commands_after_pass() -> Result<()> {
    let (mut world, mass, food) = world_with_masses(30);

    let mut commands = CommandBuffer::new();
    for (e, m) in world.query(mass).iter() {
        let Some(&m) = m else { continue };
        if m % 3 == 0 {
            commands.delete(e);
        } else if m % 3 == 1 {
            commands.add(e, food);
            commands.set(e, mass, m * 100);
        }
    }
    commands.apply(&mut world)?;

    assert_eq!(world.entity_count(), 20);
    let tagged: Vec<u32> = world
        .query(mass)
        .with(food)
        .iter()
        .filter_map(|(_, m)| m.copied())
        .collect();
    assert_eq!(tagged.len(), 10);
    assert!(tagged.iter().all(|m| m % 100 == 0));
    Ok(())
}
