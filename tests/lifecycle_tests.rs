//! Attachment and suspension lifecycle tests.
//!
//! These tests follow triggers across pulses: waits that resume later,
//! entities extracted while scripts hold their UIDs, and containers that
//! come and go with attach and detach.

use rust_mudscript::games::simple::SimpleWorld;
use rust_mudscript::triggers::{mtrig, wtrig, AttachKind, PrototypeRegistry, TriggerPrototype};
use rust_mudscript::{RunMode, ScriptConfig, ScriptEngine, World};

const HALL: i32 = 3001;
const WAITER: i32 = 10;
const WATCHER: i32 = 11;
const GUARD_TRIGGER: i32 = 12;
const SELF_DETACH: i32 = 13;
const MOB_WAITER: i32 = 14;

fn registry() -> PrototypeRegistry {
    let mut protos = PrototypeRegistry::new();
    protos.register(
        TriggerPrototype::new(WAITER, "slow echo", AttachKind::Room)
            .with_commands("set note kept\nwait 2 s\necho resumed with %note%"),
    );
    protos.register(
        TriggerPrototype::new(WATCHER, "watcher", AttachKind::Room)
            .with_commands("echo [%target.name%]"),
    );
    protos.register(
        TriggerPrototype::new(GUARD_TRIGGER, "guard speech", AttachKind::Mobile)
            .with_flags(mtrig::SPEECH)
            .with_arg("hello")
            .with_commands("echo %self%"),
    );
    protos.register(
        TriggerPrototype::new(SELF_DETACH, "one shot", AttachKind::Room)
            .with_commands("detach %self% 1\necho unreachable"),
    );
    protos.register(
        TriggerPrototype::new(MOB_WAITER, "patient guard", AttachKind::Mobile)
            .with_commands("wait 5\necho done waiting"),
    );
    protos
}

/// Test that `wait 2 s` resumes no earlier than 20 pulses later with its
/// locals intact.
#[test]
fn test_wait_resumes_with_locals() {
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let mut engine = ScriptEngine::new(ScriptConfig::default(), registry());
    let handle = engine.attach(&world, WAITER, hall, None).unwrap();

    assert_eq!(engine.run_trigger(&mut world, handle, RunMode::New), 1);
    let inst = engine.trigger(handle).unwrap();
    assert!(!inst.is_idle());
    assert_eq!(inst.locals().get("note"), Some("kept"));
    assert_eq!(engine.pending_waits(), 1);

    for _ in 0..19 {
        engine.pulse(&mut world);
    }
    assert!(world.messages().is_empty());

    engine.pulse(&mut world);
    assert_eq!(world.messages(), &["resumed with kept"]);
    assert!(engine.trigger(handle).unwrap().is_idle());
    assert!(engine.trigger(handle).unwrap().locals().is_empty());
}

/// Test that a suspended trigger does not fire again until it resumes.
#[test]
fn test_suspended_trigger_is_busy() {
    let mut protos = PrototypeRegistry::new();
    protos.register(
        TriggerPrototype::new(WAITER, "slow greeter", AttachKind::Room)
            .with_flags(wtrig::SPEECH)
            .with_arg("hi")
            .with_commands("wait 3\necho hello %actor.name%"),
    );
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let ann = world.add_player("Ann", hall);
    let bob = world.add_player("Bob", hall);
    let mut engine = ScriptEngine::new(ScriptConfig::default(), protos);
    engine.attach(&world, WAITER, hall, None).unwrap();

    engine.speech_wtrigger(&mut world, ann, "hi");
    engine.speech_wtrigger(&mut world, bob, "hi");
    assert_eq!(engine.pending_waits(), 1);

    for _ in 0..3 {
        engine.pulse(&mut world);
    }
    assert_eq!(world.messages(), &["hello Ann"]);
}

/// Test that a captured UID resolves while its entity lives and expands to
/// nothing after the entity is extracted.
#[test]
fn test_captured_self_goes_empty() {
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let ann = world.add_player("Ann", hall);
    let guard = world.add_mobile(1000, "guard", hall);
    let mut engine = ScriptEngine::new(ScriptConfig::default(), registry());
    engine.attach(&world, GUARD_TRIGGER, guard, None).unwrap();
    let watcher = engine.attach(&world, WATCHER, hall, None).unwrap();

    engine.speech_mtrigger(&mut world, ann, "hello");
    let captured = world.messages().last().cloned().unwrap();
    assert_eq!(captured, guard.to_string());
    assert!(engine.set_global(hall, "target", &captured));

    engine.run_trigger(&mut world, watcher, RunMode::New);
    assert_eq!(world.messages().last().map(String::as_str), Some("[guard]"));

    world.purge(&mut engine, guard);
    assert!(world.resolve(guard).is_none());
    assert!(engine.container(guard).is_none());

    engine.run_trigger(&mut world, watcher, RunMode::New);
    assert_eq!(world.messages().last().map(String::as_str), Some("[]"));
}

/// Test that extracting an entity cancels its pending waits.
#[test]
fn test_extract_cancels_waits() {
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let guard = world.add_mobile(1000, "guard", hall);
    let mut engine = ScriptEngine::new(ScriptConfig::default(), registry());
    let handle = engine.attach(&world, MOB_WAITER, guard, None).unwrap();

    engine.run_trigger(&mut world, handle, RunMode::New);
    assert_eq!(engine.pending_waits(), 1);

    world.purge(&mut engine, guard);
    assert_eq!(engine.pending_waits(), 0);
    for _ in 0..10 {
        engine.pulse(&mut world);
    }
    assert!(world.messages().is_empty());
}

/// Test that a sleeping mobile's resumed script waits until it wakes.
#[test]
fn test_sleeping_mobile_defers_resume() {
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let guard = world.add_mobile(1000, "guard", hall);
    let config = ScriptConfig::default();
    let retry = u64::from(config.cast_retry_pulses);
    let mut engine = ScriptEngine::new(config, registry());
    let handle = engine.attach(&world, MOB_WAITER, guard, None).unwrap();

    engine.run_trigger(&mut world, handle, RunMode::New);
    world.character_mut(guard).unwrap().position = rust_mudscript::Position::Sleeping;

    for _ in 0..5 {
        engine.pulse(&mut world);
    }
    assert!(world.messages().is_empty());
    assert_eq!(engine.pending_waits(), 1);

    world.character_mut(guard).unwrap().position = rust_mudscript::Position::Standing;
    for _ in 0..retry {
        engine.pulse(&mut world);
    }
    assert_eq!(world.messages(), &["done waiting"]);
}

/// Test that detaching the last trigger frees the container while the
/// entity itself stays reachable from other scripts.
#[test]
fn test_detach_last_trigger_frees_container() {
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let guard = world.add_mobile(1000, "guard", hall);
    let mut engine = ScriptEngine::new(ScriptConfig::default(), registry());
    engine.attach(&world, GUARD_TRIGGER, guard, None).unwrap();
    let watcher = engine.attach(&world, WATCHER, hall, None).unwrap();
    engine.set_global(guard, "mood", "calm");

    assert!(engine.detach(guard, "guard"));
    assert!(engine.container(guard).is_none());
    assert_eq!(engine.global_var(guard, "mood"), None);

    engine.set_global(hall, "target", &guard.to_string());
    engine.run_trigger(&mut world, watcher, RunMode::New);
    assert_eq!(world.messages(), &["[guard]"]);
}

/// Test that a script detaching its own trigger stops after that command.
#[test]
fn test_self_detach_stops_run() {
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let mut engine = ScriptEngine::new(ScriptConfig::default(), registry());
    let handle = engine.attach(&world, SELF_DETACH, hall, None).unwrap();

    engine.run_trigger(&mut world, handle, RunMode::New);
    assert!(world.messages().is_empty());
    assert!(engine.trigger(handle).is_none());
    assert!(engine.container(hall).is_none());
}

/// Test that scripts can attach triggers through the world.
#[test]
fn test_attach_command() {
    let mut protos = registry();
    protos.register(
        TriggerPrototype::new(20, "installer", AttachKind::Room)
            .with_commands(&format!("attach {GUARD_TRIGGER} guard")),
    );
    let mut world = SimpleWorld::new();
    let hall = world.add_room(HALL, "Hall");
    let guard = world.add_mobile(1000, "guard", hall);
    let mut engine = ScriptEngine::new(ScriptConfig::default(), protos);
    let installer = engine.attach(&world, 20, hall, None).unwrap();

    engine.run_trigger(&mut world, installer, RunMode::New);
    let container = engine.container(guard).unwrap();
    assert!(container.has_type(mtrig::SPEECH));
    assert_eq!(engine.attached_count(), 2);
}

/// Test that random triggers only fire in zones with players unless
/// flagged global.
#[test]
fn test_random_triggers_follow_zone_activity() {
    let mut protos = PrototypeRegistry::new();
    protos.register(
        TriggerPrototype::new(30, "drip", AttachKind::Room)
            .with_flags(wtrig::RANDOM)
            .with_narg(100)
            .with_commands("echo drip"),
    );
    protos.register(
        TriggerPrototype::new(31, "wind", AttachKind::Room)
            .with_flags(wtrig::RANDOM | wtrig::GLOBAL)
            .with_narg(100)
            .with_commands("echo wind"),
    );
    let mut world = SimpleWorld::new();
    let cave = world.add_room(100, "Cave");
    let peak = world.add_room(900, "Peak");
    let config = ScriptConfig::default().with_random_interval(1);
    let mut engine = ScriptEngine::new(config, protos);
    engine.attach(&world, 30, cave, None).unwrap();
    engine.attach(&world, 31, peak, None).unwrap();

    engine.pulse(&mut world);
    assert_eq!(world.messages(), &["wind"]);

    world.clear_messages();
    world.add_player("Ann", cave);
    engine.pulse(&mut world);
    assert_eq!(world.messages(), &["drip", "wind"]);
}

/// Test that time triggers fire once when the hour they name arrives.
#[test]
fn test_time_triggers() {
    let mut protos = PrototypeRegistry::new();
    protos.register(
        TriggerPrototype::new(40, "dawn bell", AttachKind::Room)
            .with_flags(wtrig::TIME)
            .with_narg(6)
            .with_commands("echo The bell rings at %time%."),
    );
    let mut world = SimpleWorld::new();
    let tower = world.add_room(HALL, "Bell Tower");
    let mut engine = ScriptEngine::new(ScriptConfig::default(), protos);
    engine.attach(&world, 40, tower, None).unwrap();

    engine.pulse(&mut world);
    world.set_hour(5);
    engine.pulse(&mut world);
    assert!(world.messages().is_empty());

    world.set_hour(6);
    engine.pulse(&mut world);
    engine.pulse(&mut world);
    assert_eq!(world.messages(), &["The bell rings at 6."]);
}
