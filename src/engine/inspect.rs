//! Admin inspectors.

use std::fmt::Write as _;

use crate::core::flags::sprint_bits;
use crate::core::{Uid, Vnum};
use crate::script::VarTable;

use super::ScriptEngine;

impl ScriptEngine {
    /// Describe a trigger prototype, or `None` for an unknown vnum.
    #[must_use]
    pub fn stat_trigger(&self, vnum: Vnum) -> Option<String> {
        let proto = self.prototypes.get(vnum)?;
        let mut out = String::new();
        let _ = writeln!(out, "Name: '{}',  VNum: [{:5}]", proto.name, proto.vnum);
        let _ = writeln!(out, "Trigger Intended Assignment: {}", proto.attach);
        let _ = writeln!(
            out,
            "Trigger Type: {}, Numeric Arg: {}, Arg list: {}",
            sprint_bits(proto.flags.bits(), proto.attach.type_names()),
            proto.narg,
            if proto.arg.is_empty() { "None" } else { proto.arg.as_str() }
        );
        out.push_str("Commands:\n");
        out.push_str(&proto.script.source());
        out.push('\n');
        Some(out)
    }

    /// Describe the script state of an entity.
    #[must_use]
    pub fn stat_script(&self, owner: Uid) -> String {
        let Some(container) = self.containers.get(&owner) else {
            return "Script information: None.\n".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Script information: {} trigger(s), types: {}",
            container.triggers.len(),
            sprint_bits(container.types.bits(), container.kind.type_names())
        );
        write_vars(&mut out, "Global Variables", &container.globals);

        for &handle in container.triggers.iter() {
            let Some(inst) = self.triggers.get(handle) else {
                continue;
            };
            let proto = &inst.proto;
            let _ = writeln!(
                out,
                "  Trigger: {}, VNum: [{:5}], Type: {}, Numeric Arg: {}, Arg list: {}",
                proto.name,
                proto.vnum,
                sprint_bits(proto.flags.bits(), proto.attach.type_names()),
                proto.narg,
                if proto.arg.is_empty() { "None" } else { proto.arg.as_str() }
            );

            match (inst.wait, inst.resume_at) {
                (Some(id), Some(line)) => {
                    let due = self
                        .waits
                        .due_at(id)
                        .map_or_else(|| "?".to_string(), |due| due.to_string());
                    let text = proto.script.line(line).map_or("", |l| l.text.trim());
                    let _ = writeln!(
                        out,
                        "    Wait: pulse {due} (now {}), Current line: {text}",
                        self.pulse_count
                    );
                    write_vars(&mut out, "    Variables", &inst.locals);
                }
                _ if !inst.is_idle() => {
                    out.push_str("    Running\n");
                }
                _ => {}
            }
        }
        out
    }
}

fn write_vars(out: &mut String, heading: &str, vars: &VarTable) {
    if vars.is_empty() {
        let _ = writeln!(out, "{heading}: None");
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for var in vars.iter() {
        let _ = writeln!(out, "      {}:[{}]", var.name, var.value.replace(crate::core::UID_SIGIL, "#"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptConfig;
    use crate::games::simple::SimpleWorld;
    use crate::triggers::{wtrig, AttachKind, PrototypeRegistry, TriggerPrototype};

    fn setup() -> (ScriptEngine, SimpleWorld, Uid) {
        let mut protos = PrototypeRegistry::new();
        protos.register(
            TriggerPrototype::new(7, "slow echo", AttachKind::Room)
                .with_flags(wtrig::RESET | wtrig::RANDOM)
                .with_narg(100)
                .with_commands("set who nobody\nwait 5\necho done"),
        );
        let mut world = SimpleWorld::new();
        let room = world.add_room(100, "Hall");
        let engine = ScriptEngine::new(ScriptConfig::default(), protos);
        (engine, world, room)
    }

    #[test]
    fn test_stat_trigger() {
        let (engine, _, _) = setup();
        let text = engine.stat_trigger(7).unwrap();
        assert!(text.contains("Name: 'slow echo'"));
        assert!(text.contains("Trigger Intended Assignment: Room"));
        assert!(text.contains("Random Reset"));
        assert!(text.contains("wait 5"));
        assert!(engine.stat_trigger(8).is_none());
    }

    #[test]
    fn test_stat_script_shows_waiting_trigger() {
        let (mut engine, mut world, room) = setup();
        assert_eq!(engine.stat_script(room), "Script information: None.\n");

        let handle = engine.attach(&world, 7, room, None).unwrap();
        engine.set_global(room, "visits", "3");
        engine.run_trigger(&mut world, handle, crate::engine::RunMode::New);

        let text = engine.stat_script(room);
        assert!(text.contains("visits:[3]"));
        assert!(text.contains("Trigger: slow echo"));
        assert!(text.contains("Wait: pulse 5"));
        assert!(text.contains("Current line: echo done"));
        assert!(text.contains("who:[nobody]"));
    }
}
