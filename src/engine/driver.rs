//! The script driver.
//!
//! Runs one trigger instance's command list against its owner. A run starts
//! fresh at line 0 or resumes at the cursor saved by a `wait`. It ends when
//! the list is exhausted, on `halt` or `return`, when the loop ceiling is
//! hit, or when the owner leaves the world. A suspended run keeps its depth
//! and locals and parks a continuation in the wait queue.
//!
//! Control flow uses the jump targets resolved when the body was compiled;
//! malformed blocks are logged and the driver carries on as best it can.

use std::sync::Arc;

use tracing::{debug, error};

use crate::core::text::{atoi, is_truthy, split_word};
use crate::core::{Handle, Uid};
use crate::script::{eval_op, script_log, Continuation, Op, SubstContext, WaitKind};
use crate::triggers::{AttachKind, TriggerPrototype};
use crate::world::{World, HOURS_PER_DAY};

use super::ScriptEngine;

/// How a run enters the command list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Start at the first line with depth 1.
    New,
    /// Continue a suspended run at its saved cursor.
    Resume,
}

/// What a line did to the flow of the run.
enum Flow {
    /// Go on with the line after the cursor.
    Next,
    /// Stop and clean up.
    Stop,
    /// Already suspended; return without cleaning up.
    Suspended,
}

impl ScriptEngine {
    /// Run (or resume) a trigger. Nonzero means the triggering action is
    /// allowed, zero means it is blocked.
    pub fn run_trigger(&mut self, world: &mut dyn World, handle: Handle, mode: RunMode) -> i32 {
        let Some(proto) = self.triggers.get(handle).map(|inst| Arc::clone(&inst.proto)) else {
            return 1;
        };

        if self.depth > self.config.max_script_depth {
            error!(
                target: "scripts",
                vnum = proto.vnum,
                name = %proto.name,
                "triggers recursed beyond maximum allowed depth"
            );
            if mode == RunMode::New {
                if let Some(inst) = self.triggers.get_mut(handle) {
                    inst.reset();
                }
            }
            return 1;
        }

        self.depth += 1;
        let result = self.drive(world, handle, &proto, mode);
        self.depth -= 1;
        result
    }

    fn drive(
        &mut self,
        world: &mut dyn World,
        handle: Handle,
        proto: &TriggerPrototype,
        mode: RunMode,
    ) -> i32 {
        let Some(inst) = self.triggers.get_mut(handle) else {
            return 1;
        };
        let owner = inst.owner;
        let mut cursor = match mode {
            RunMode::New => {
                if let Some(id) = inst.wait.take() {
                    self.waits.cancel(id);
                }
                inst.depth = 1;
                inst.loops = 0;
                inst.resume_at = None;
                0
            }
            RunMode::Resume => {
                inst.wait = None;
                inst.depth = inst.depth.max(1);
                inst.resume_at.take().unwrap_or(0)
            }
        };

        let guarded = proto.attach == AttachKind::Mobile && !proto.is_death_trigger();
        let mut result = 1;
        let mut loops_here = 0;

        while cursor < proto.script.len() {
            if !self.triggers.contains(handle) {
                return result;
            }

            if guarded {
                let Some(mob) = world.character_by_uid(owner) else {
                    break;
                };
                if !mob.is_awake() {
                    if mode == RunMode::New {
                        self.finish(handle);
                        return 0;
                    }
                    self.suspend(handle, owner, cursor, self.cast_retry(), WaitKind::Casting);
                    return result;
                }
                if mob.casting {
                    self.suspend(handle, owner, cursor, self.cast_retry(), WaitKind::Casting);
                    return result;
                }
            }

            let Some(line) = proto.script.line(cursor) else {
                break;
            };

            match &line.op {
                Op::Nop | Op::Case { .. } | Op::Default | Op::Done { head: None } => {}

                Op::If { cond, next } => {
                    if self.eval_cond(world, handle, proto, cond) {
                        self.adjust_depth(handle, 1);
                    } else {
                        match self.find_else_end(world, handle, proto, *next) {
                            Some(target) => cursor = target,
                            None => break,
                        }
                    }
                }

                Op::ElseIf { end, .. } | Op::Else { end } => {
                    if self.if_depth(handle) <= 1 {
                        script_log(proto, "'else' without 'if'");
                    } else {
                        self.adjust_depth(handle, -1);
                        match end {
                            Some(end) => cursor = *end,
                            None => {
                                script_log(proto, "'if' without 'end'");
                                break;
                            }
                        }
                    }
                }

                Op::End => {
                    if self.if_depth(handle) <= 1 {
                        script_log(proto, "'end' without 'if'");
                    } else {
                        self.adjust_depth(handle, -1);
                    }
                }

                Op::While { cond, done } => {
                    let Some(done) = *done else {
                        script_log(proto, "'while' without 'done'");
                        break;
                    };
                    if !self.eval_cond(world, handle, proto, cond) {
                        cursor = done;
                        loops_here = 0;
                    }
                }

                Op::Done { head: Some(head) } => {
                    let Some(Op::While { cond, .. }) = proto.script.op(*head) else {
                        cursor += 1;
                        continue;
                    };
                    if self.eval_cond(world, handle, proto, cond) {
                        cursor = *head;
                        loops_here += 1;
                        let total = match self.triggers.get_mut(handle) {
                            Some(inst) => {
                                inst.loops += 1;
                                inst.loops
                            }
                            None => return result,
                        };
                        if loops_here >= self.config.loop_defer_after {
                            self.suspend(handle, owner, cursor + 1, 1, WaitKind::Wait);
                            return result;
                        }
                        if total >= self.config.loop_abort_after {
                            error!(
                                target: "scripts",
                                vnum = proto.vnum,
                                name = %proto.name,
                                "looped {} times",
                                total
                            );
                            break;
                        }
                    }
                }

                Op::Switch { expr, arms, done } => {
                    match self.find_case(world, handle, proto, expr, arms) {
                        Some(arm) => cursor = arm,
                        None => match done {
                            Some(done) => cursor = *done,
                            None => break,
                        },
                    }
                }

                Op::Break { done } => match done {
                    Some(done) => cursor = *done,
                    None => script_log(proto, "'break' outside a loop"),
                },

                Op::Command => {
                    let cmd = self.substitute(&*world, handle, proto, &line.text);
                    match self.command(world, handle, owner, proto, cursor, &cmd, &mut result) {
                        Flow::Next => {}
                        Flow::Stop => break,
                        Flow::Suspended => return result,
                    }
                }
            }

            cursor += 1;
        }

        self.finish(handle);
        result
    }

    /// Run one substituted command line.
    #[allow(clippy::too_many_arguments)]
    fn command(
        &mut self,
        world: &mut dyn World,
        handle: Handle,
        owner: Uid,
        proto: &TriggerPrototype,
        cursor: usize,
        cmd: &str,
        result: &mut i32,
    ) -> Flow {
        let (word, rest) = split_word(cmd);
        match word.to_ascii_lowercase().as_str() {
            "eval" => {
                let (name, expr) = split_word(rest);
                if name.is_empty() {
                    script_log(proto, format_args!("eval w/o an arg: '{cmd}'"));
                } else {
                    let value = self.eval(&*world, handle, proto, expr);
                    self.set_local(handle, name, value);
                }
            }
            "halt" => return Flow::Stop,
            "global" => {
                if rest.is_empty() {
                    script_log(proto, format_args!("global w/o an arg: '{cmd}'"));
                }
                for name in rest.split_whitespace() {
                    let var = self
                        .triggers
                        .get_mut(handle)
                        .and_then(|inst| inst.locals.take(name));
                    match var {
                        Some(var) => {
                            if let Some(container) = self.containers.get_mut(&owner) {
                                container.globals.insert(var);
                            }
                        }
                        None => script_log(
                            proto,
                            format_args!("local var '{name}' not found in global call"),
                        ),
                    }
                }
            }
            "return" => {
                *result = if rest.is_empty() {
                    script_log(proto, format_args!("return w/o an arg: '{cmd}'"));
                    1
                } else {
                    i32::try_from(atoi(rest)).unwrap_or(1)
                };
                return Flow::Stop;
            }
            "set" => {
                let (name, value) = split_word(rest);
                if name.is_empty() {
                    script_log(proto, format_args!("set w/o an arg: '{cmd}'"));
                } else {
                    self.set_local(handle, name, value.to_string());
                }
            }
            "unset" => {
                let name = rest.trim();
                if name.is_empty() {
                    script_log(proto, format_args!("unset w/o an arg: '{cmd}'"));
                } else {
                    let removed = self
                        .containers
                        .get_mut(&owner)
                        .is_some_and(|container| container.globals.remove(name));
                    if !removed {
                        if let Some(inst) = self.triggers.get_mut(handle) {
                            inst.locals.remove(name);
                        }
                    }
                }
            }
            "wait" => match self.wait_delay(&*world, rest) {
                Ok(delay) => {
                    self.suspend(handle, owner, cursor + 1, delay, WaitKind::Wait);
                    return Flow::Suspended;
                }
                Err(message) => script_log(proto, format_args!("{message}: '{cmd}'")),
            },
            _ => {
                world.execute(self, owner, cmd);
                if !self.triggers.contains(handle) {
                    debug!(target: "scripts", vnum = proto.vnum, owner = owner.raw(), "trigger removed by its own command");
                    return Flow::Stop;
                }
            }
        }
        Flow::Next
    }

    /// Pulses until a `wait` argument is satisfied.
    fn wait_delay(&self, world: &dyn World, arg: &str) -> Result<u64, &'static str> {
        let arg = arg.trim();
        if arg.is_empty() {
            return Err("wait w/o an arg");
        }

        let hour_pulses = self.config.pulses_per_mud_hour();

        if let Some(when) = arg
            .get(..6)
            .filter(|prefix| prefix.eq_ignore_ascii_case("until "))
            .map(|_| arg[6..].trim())
        {
            let (hours, minutes) = match when.split_once(':') {
                Some((h, m)) => (atoi(h), atoi(m)),
                None => {
                    let hhmm = atoi(when);
                    (hhmm / 100, hhmm % 100)
                }
            };
            // Clock times only: hour 0-23, minute 0-59.
            if !(0..i64::from(HOURS_PER_DAY)).contains(&hours) || !(0..60).contains(&minutes) {
                return Err("bad wait time");
            }
            let minute_of_day = u64::try_from(hours * 60 + minutes).map_err(|_| "bad wait time")?;
            let target = minute_of_day
                .checked_mul(hour_pulses)
                .ok_or("bad wait time")?
                / 60;
            let now = (self.pulse_count % hour_pulses.max(1))
                .saturating_add(u64::from(world.time().hours).saturating_mul(hour_pulses));
            let day = u64::from(HOURS_PER_DAY).saturating_mul(hour_pulses);
            return Ok(if now >= target {
                day.saturating_sub(now).saturating_add(target)
            } else {
                target - now
            });
        }

        let digits = arg.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err("bad wait argument");
        }
        let amount: u64 = arg[..digits].parse().map_err(|_| "bad wait argument")?;
        let unit = arg[digits..].trim_start().chars().next();
        Ok(match unit {
            Some('s') => self.config.pulses_for_seconds(amount),
            Some('t') => amount.saturating_mul(hour_pulses),
            _ => amount,
        })
    }

    /// Walk an `if` chain whose condition failed. Returns the line to
    /// continue after, or `None` when the chain never closes.
    fn find_else_end(
        &mut self,
        world: &dyn World,
        handle: Handle,
        proto: &TriggerPrototype,
        mut next: Option<usize>,
    ) -> Option<usize> {
        while let Some(at) = next {
            match proto.script.op(at) {
                Some(Op::ElseIf { cond, next: after, .. }) => {
                    if self.eval_cond(world, handle, proto, cond) {
                        self.adjust_depth(handle, 1);
                        return Some(at);
                    }
                    next = *after;
                }
                Some(Op::Else { .. }) => {
                    self.adjust_depth(handle, 1);
                    return Some(at);
                }
                Some(_) => return Some(at),
                None => break,
            }
        }
        script_log(proto, "'if' without 'end'");
        None
    }

    /// The `case` or `default` line a `switch` enters.
    fn find_case(
        &mut self,
        world: &dyn World,
        handle: Handle,
        proto: &TriggerPrototype,
        expr: &str,
        arms: &[usize],
    ) -> Option<usize> {
        let value = self.eval(world, handle, proto, expr);
        arms.iter().copied().find(|&arm| match proto.script.op(arm) {
            Some(Op::Case { expr }) => {
                let case = self.eval(world, handle, proto, expr);
                is_truthy(&eval_op("==", &value, &case))
            }
            Some(Op::Default) => true,
            _ => false,
        })
    }

    fn eval_cond(
        &mut self,
        world: &dyn World,
        handle: Handle,
        proto: &TriggerPrototype,
        cond: &str,
    ) -> bool {
        is_truthy(&self.eval(world, handle, proto, cond))
    }

    fn eval(&mut self, world: &dyn World, handle: Handle, proto: &TriggerPrototype, expr: &str) -> String {
        match self.subst_context(world, handle, proto) {
            Some(mut ctx) => ctx.eval(expr),
            None => String::new(),
        }
    }

    fn substitute(
        &mut self,
        world: &dyn World,
        handle: Handle,
        proto: &TriggerPrototype,
        text: &str,
    ) -> String {
        match self.subst_context(world, handle, proto) {
            Some(mut ctx) => ctx.substitute(text),
            None => String::new(),
        }
    }

    fn subst_context<'a>(
        &'a mut self,
        world: &'a dyn World,
        handle: Handle,
        proto: &'a TriggerPrototype,
    ) -> Option<SubstContext<'a>> {
        let inst = self.triggers.get(handle)?;
        Some(SubstContext {
            world,
            owner: inst.owner,
            trigger: proto,
            locals: &inst.locals,
            globals: self.containers.get(&inst.owner).map(|c| &c.globals),
            rng: &mut self.rng,
        })
    }

    fn set_local(&mut self, handle: Handle, name: &str, value: String) {
        if let Some(inst) = self.triggers.get_mut(handle) {
            inst.locals.set(name, value);
        }
    }

    fn if_depth(&self, handle: Handle) -> u32 {
        self.triggers.get(handle).map_or(0, |inst| inst.depth)
    }

    fn adjust_depth(&mut self, handle: Handle, delta: i32) {
        if let Some(inst) = self.triggers.get_mut(handle) {
            inst.depth = inst.depth.saturating_add_signed(delta);
        }
    }

    fn cast_retry(&self) -> u64 {
        u64::from(self.config.cast_retry_pulses)
    }

    /// Park the run and schedule its continuation.
    fn suspend(&mut self, handle: Handle, owner: Uid, resume_at: usize, delay: u64, kind: WaitKind) {
        let id = self.waits.schedule(
            self.pulse_count,
            delay,
            Continuation {
                trigger: handle,
                owner,
                resume_at,
                kind,
            },
        );
        if let Some(inst) = self.triggers.get_mut(handle) {
            inst.resume_at = Some(resume_at);
            inst.wait = Some(id);
            debug!(
                target: "scripts",
                vnum = inst.proto.vnum,
                owner = owner.raw(),
                line = resume_at,
                delay,
                ?kind,
                "suspended trigger"
            );
        }
    }

    /// End the run: back to idle, locals released.
    fn finish(&mut self, handle: Handle) {
        if let Some(inst) = self.triggers.get_mut(handle) {
            inst.reset();
        }
    }
}
