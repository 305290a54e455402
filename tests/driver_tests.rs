//! Script driver integration tests.
//!
//! These tests run whole scripts against a `SimpleWorld` and check control
//! flow, variable scoping and the loop and recursion guards through what
//! the scripts echo.

use rust_mudscript::games::simple::SimpleWorld;
use rust_mudscript::triggers::{mtrig, wtrig, AttachKind, PrototypeRegistry, TriggerPrototype};
use rust_mudscript::{Handle, RunMode, ScriptConfig, ScriptEngine, Uid};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

const ROOM_VNUM: i32 = 3001;
const SCRIPT_VNUM: i32 = 1;
const READER_VNUM: i32 = 2;
const UNSET_VNUM: i32 = 3;

/// Route script logs to the test output. Set `RUST_LOG=scripts=debug` to
/// see attach and wait traffic.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// A room with one trigger running `body`.
fn setup_with(config: ScriptConfig, body: &str) -> (ScriptEngine, SimpleWorld, Uid, Handle) {
    init_logging();
    let mut protos = PrototypeRegistry::new();
    protos.register(
        TriggerPrototype::new(SCRIPT_VNUM, "script under test", AttachKind::Room)
            .with_flags(wtrig::COMMAND)
            .with_arg("go")
            .with_commands(body),
    );
    let mut world = SimpleWorld::new();
    let room = world.add_room(ROOM_VNUM, "The Laboratory");
    let mut engine = ScriptEngine::new(config, protos);
    let handle = engine.attach(&world, SCRIPT_VNUM, room, None).unwrap();
    (engine, world, room, handle)
}

fn setup(body: &str) -> (ScriptEngine, SimpleWorld, Uid, Handle) {
    setup_with(ScriptConfig::default(), body)
}

/// Run `body` once and return what it echoed.
fn echoes(body: &str) -> Vec<String> {
    let (mut engine, mut world, _, handle) = setup(body);
    engine.run_trigger(&mut world, handle, RunMode::New);
    world.messages().to_vec()
}

/// Test that exactly one branch of an if chain runs.
#[test]
fn test_if_chain_runs_one_branch() {
    let chain = "\
if %x% == 1
  echo one
elseif %x% == 2
  echo two
elseif %x% == 3
  echo three
else
  echo other
end
echo after";

    for (x, expected) in [(1, "one"), (2, "two"), (3, "three"), (4, "other")] {
        let out = echoes(&format!("set x {x}\n{chain}"));
        assert_eq!(out, vec![expected, "after"], "x = {x}");
    }
}

/// Test that a false if without else skips to its end.
#[test]
fn test_if_without_else() {
    assert_eq!(
        echoes("if 0\n  echo hidden\nend\necho shown"),
        vec!["shown"]
    );
}

/// Test that a while loop obeys its condition.
#[test]
fn test_while_counts() {
    let out = echoes(
        "set i 0\n\
         while %i% < 3\n\
           echo tick %i%\n\
           eval i %i% + 1\n\
         done\n\
         echo done %i%",
    );
    assert_eq!(out, vec!["tick 0", "tick 1", "tick 2", "done 3"]);
}

/// Test that break leaves the innermost loop.
#[test]
fn test_break_leaves_loop() {
    let out = echoes(
        "set i 0\n\
         while 1\n\
           eval i %i% + 1\n\
           if %i% == 4\n\
             break\n\
           end\n\
         done\n\
         echo stopped at %i%",
    );
    assert_eq!(out, vec!["stopped at 4"]);
}

/// Test that a long loop is deferred to later pulses and finally aborted.
#[test]
fn test_loop_defer_and_abort() {
    let config = ScriptConfig::default().with_loop_limits(5, 12);
    let (mut engine, mut world, _, handle) =
        setup_with(config, "set i 0\nwhile 1\n  eval i %i% + 1\ndone\necho never");

    engine.run_trigger(&mut world, handle, RunMode::New);
    let inst = engine.trigger(handle).unwrap();
    assert!(!inst.is_idle());
    assert_eq!(inst.locals().get("i"), Some("5"));
    assert_eq!(engine.pending_waits(), 1);

    engine.pulse(&mut world);
    assert_eq!(engine.trigger(handle).unwrap().locals().get("i"), Some("10"));

    engine.pulse(&mut world);
    let inst = engine.trigger(handle).unwrap();
    assert!(inst.is_idle());
    assert_eq!(engine.pending_waits(), 0);
    assert!(world.messages().is_empty());
}

/// Test switch matching, fallthrough into default, and no-match.
#[test]
fn test_switch() {
    let body = |value: &str| {
        format!(
            "switch {value}\n\
               case apple\n\
                 echo fruit\n\
                 break\n\
               case 7\n\
                 echo seven\n\
               default\n\
                 echo anything\n\
             done\n\
             echo after"
        )
    };
    assert_eq!(echoes(&body("apple")), vec!["fruit", "after"]);
    assert_eq!(echoes(&body("7")), vec!["seven", "anything", "after"]);
    assert_eq!(echoes(&body("pear")), vec!["anything", "after"]);

    let no_default = "switch 9\n  case 1\n    echo one\ndone\necho after";
    assert_eq!(echoes(no_default), vec!["after"]);
}

/// Test expression precedence through eval.
#[test]
fn test_eval_precedence() {
    assert_eq!(echoes("eval result (5 + 3) * 2\necho %result%"), vec!["16"]);
    assert_eq!(echoes("eval result 2 + 3 * 4\necho %result%"), vec!["14"]);
}

/// Test that comparisons are numeric only when both sides are integers.
#[test]
fn test_comparison_modes() {
    let out = echoes(
        "eval a 10 > 9\n\
         eval b 10 > 9x\n\
         eval c 007 == 7\n\
         eval d abc < abd\n\
         echo %a% %b% %c% %d%",
    );
    assert_eq!(out, vec!["1 0 1 1"]);
}

/// Test set, global and unset visibility across two triggers.
#[test]
fn test_variable_scopes() {
    let mut protos = PrototypeRegistry::new();
    protos.register(
        TriggerPrototype::new(SCRIPT_VNUM, "writer", AttachKind::Room)
            .with_commands("set mood happy\nglobal mood\nset scratch 5"),
    );
    protos.register(
        TriggerPrototype::new(READER_VNUM, "reader", AttachKind::Room)
            .with_commands("echo mood=%mood% scratch=%scratch%"),
    );
    protos.register(
        TriggerPrototype::new(UNSET_VNUM, "forget", AttachKind::Room).with_commands("unset mood"),
    );
    let mut world = SimpleWorld::new();
    let room = world.add_room(ROOM_VNUM, "Hall");
    let mut engine = ScriptEngine::new(ScriptConfig::default(), protos);
    let writer = engine.attach(&world, SCRIPT_VNUM, room, None).unwrap();
    let reader = engine.attach(&world, READER_VNUM, room, None).unwrap();
    let forget = engine.attach(&world, UNSET_VNUM, room, None).unwrap();

    engine.run_trigger(&mut world, writer, RunMode::New);
    assert_eq!(engine.global_var(room, "mood"), Some("happy"));
    assert!(engine.trigger(writer).unwrap().locals().is_empty());

    engine.run_trigger(&mut world, reader, RunMode::New);
    engine.run_trigger(&mut world, forget, RunMode::New);
    engine.run_trigger(&mut world, reader, RunMode::New);

    assert_eq!(world.messages(), &["mood=happy scratch=", "mood= scratch="]);
    assert_eq!(engine.global_var(room, "mood"), None);
}

/// Test that a local shadows a global of the same name.
#[test]
fn test_local_shadows_global() {
    let (mut engine, mut world, room, handle) = setup("echo %mood%\nset mood sad\necho %mood%");
    assert!(engine.set_global(room, "mood", "happy"));
    engine.run_trigger(&mut world, handle, RunMode::New);
    assert_eq!(world.messages(), &["happy", "sad"]);
}

/// Test that return sets the result and stops the run.
#[test]
fn test_return_value() {
    let (mut engine, mut world, _, handle) = setup("return 0\necho unreachable");
    assert_eq!(engine.run_trigger(&mut world, handle, RunMode::New), 0);
    assert!(world.messages().is_empty());

    let (mut engine, mut world, _, handle) = setup("echo fine");
    assert_eq!(engine.run_trigger(&mut world, handle, RunMode::New), 1);
}

/// Test that a bad wait argument is skipped rather than suspending.
#[test]
fn test_bad_wait_continues() {
    let (mut engine, mut world, _, handle) = setup("wait soon\necho carried on");
    engine.run_trigger(&mut world, handle, RunMode::New);
    assert_eq!(world.messages(), &["carried on"]);
    assert_eq!(engine.pending_waits(), 0);
}

/// Shared buffer that collects formatted log output.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `body`, then one more pulse, and return what it echoed, the
/// warnings it logged and the waits left pending.
fn run_logged(body: &str) -> (Vec<String>, String, usize) {
    let (mut engine, mut world, _, handle) = setup(body);
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        engine.run_trigger(&mut world, handle, RunMode::New);
        engine.pulse(&mut world);
    });
    (world.messages().to_vec(), capture.text(), engine.pending_waits())
}

/// Test that `wait until` rejects hours past the end of the day.
#[test]
fn test_wait_until_bad_hour_is_logged() {
    for arg in ["25:00", "24:00", "2500"] {
        let (out, log, pending) = run_logged(&format!("wait until {arg}\necho after"));
        assert_eq!(out, vec!["after"], "{arg}");
        assert!(log.contains("bad wait time"), "{arg}: {log}");
        assert_eq!(pending, 0, "{arg}");
    }
}

/// Test that `wait until` rejects minutes past the end of the hour.
#[test]
fn test_wait_until_bad_minute_is_logged() {
    for arg in ["12:75", "12:60", "1299"] {
        let (out, log, pending) = run_logged(&format!("wait until {arg}\necho after"));
        assert_eq!(out, vec!["after"], "{arg}");
        assert!(log.contains("bad wait time"), "{arg}: {log}");
        assert_eq!(pending, 0, "{arg}");
    }
}

/// Test that enormous `wait until` hours are logged instead of
/// overflowing.
#[test]
fn test_wait_until_huge_hour_is_logged() {
    for arg in ["999999999999999999:00", "1000000000000000:00", "99999999999999999999999"] {
        let (out, log, pending) = run_logged(&format!("wait until {arg}\necho after"));
        assert_eq!(out, vec!["after"], "{arg}");
        assert!(log.contains("bad wait time"), "{arg}: {log}");
        assert_eq!(pending, 0, "{arg}");
    }
}

/// Test that a non-numeric wait is logged and the script carries on.
#[test]
fn test_wait_non_numeric_is_logged() {
    let (out, log, pending) = run_logged("wait foo\necho after");
    assert_eq!(out, vec!["after"]);
    assert!(log.contains("bad wait argument"), "{log}");
    assert!(log.contains("wait foo"), "{log}");
    assert_eq!(pending, 0);
}

/// Test that nested trigger runs stop at the configured depth.
#[test]
fn test_recursion_limit() {
    let words = ["one", "two", "three", "four", "five"];
    let mut protos = PrototypeRegistry::new();
    for (i, pair) in words.windows(2).enumerate() {
        protos.register(
            TriggerPrototype::new(100 + i as i32, "relay", AttachKind::Mobile)
                .with_flags(mtrig::SPEECH)
                .with_arg(pair[0])
                .with_commands(&format!("say {}", pair[1])),
        );
    }

    let mut world = SimpleWorld::new();
    let room = world.add_room(ROOM_VNUM, "Echo Chamber");
    let ann = world.add_player("Ann", room);
    let config = ScriptConfig::default().with_max_depth(2);
    let mut engine = ScriptEngine::new(config, protos);
    let mut relays = Vec::new();
    for i in 0..4 {
        let mob = world.add_mobile(500 + i, &format!("relay{i}"), room);
        engine.attach(&world, 100 + i, mob, None).unwrap();
        relays.push(mob);
    }

    engine.speech_mtrigger(&mut world, ann, "one");

    assert_eq!(
        world.messages(),
        &[
            "relay0 says, 'two'",
            "relay1 says, 'three'",
            "relay2 says, 'four'",
        ]
    );

    // The refused run was reset, so every relay is idle again.
    for mob in relays {
        let container = engine.container(mob).unwrap();
        assert!(container
            .triggers()
            .iter()
            .all(|&h| engine.trigger(h).unwrap().is_idle()));
    }
}
