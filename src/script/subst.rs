//! Variable substitution.
//!
//! Expands `%name%`, `%name.field%` and `%name.field[value]%` tokens in a
//! script line. `%%` is a literal percent sign.
//!
//! A name is looked up in the instance's locals, then the container's
//! globals. The reserved name `self` stands for the script's owner. With a
//! field, the variable's value is resolved to a live entity (a UID, a room
//! vnum, or a keyword near the owner) and the field is read from it. The
//! names `time`, `random`, `get` and `string` are static pseudo-objects
//! whose fields compute values instead.
//!
//! Substitution never changes the world. Authoring mistakes (unknown
//! fields, fields on non-entities) are logged and expand to nothing.

use crate::core::text::{atoi, capitalize, is_number, split_word};
use crate::core::{EntityRef, ScriptRng, Uid, ROOM_ID_BASE, UID_SIGIL};
use crate::triggers::TriggerPrototype;
use crate::world::{Direction, World};

use super::expr::eval_expr;
use super::script_log;
use super::vars::VarTable;

/// Everything substitution needs to read while a script runs.
pub struct SubstContext<'a> {
    pub world: &'a dyn World,
    /// The entity the running script is attached to.
    pub owner: Uid,
    pub trigger: &'a TriggerPrototype,
    pub locals: &'a VarTable,
    pub globals: Option<&'a VarTable>,
    pub rng: &'a mut ScriptRng,
}

impl<'a> SubstContext<'a> {
    /// Expand every `%…%` token in `line`.
    pub fn substitute(&mut self, line: &str) -> String {
        if !line.contains('%') {
            return line.to_string();
        }

        let mut out = String::with_capacity(line.len());
        let mut rest = line;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];

            if let Some(after) = rest.strip_prefix('%') {
                out.push('%');
                rest = after;
                continue;
            }

            let var_end = rest.find(['%', '.']).unwrap_or(rest.len());
            let var = &rest[..var_end];
            rest = &rest[var_end..];

            let mut field = "";
            let mut value = String::new();
            if let Some(after) = rest.strip_prefix('.') {
                let field_end = after.find(['%', '[']).unwrap_or(after.len());
                field = &after[..field_end];
                rest = &after[field_end..];

                if let Some(after) = rest.strip_prefix('[') {
                    let value_end = after.find(']').unwrap_or(after.len());
                    value = self.substitute(&after[..value_end]);
                    rest = &after[value_end..];
                    rest = rest.strip_prefix(']').unwrap_or(rest);
                }
            }
            rest = rest.strip_prefix('%').unwrap_or(rest);

            let replacement = self.find_replacement(var, field, &value);
            out.push_str(&replacement);
        }

        out.push_str(rest);
        out
    }

    /// Evaluate an expression, substituting its operands.
    pub fn eval(&mut self, expr: &str) -> String {
        eval_expr(expr, &mut |text: &str| self.substitute(text))
    }

    fn lookup(&self, var: &str) -> Option<&'a str> {
        self.locals
            .get(var)
            .or_else(|| self.globals.and_then(|g| g.get(var)))
    }

    fn find_replacement(&mut self, var: &str, field: &str, value: &str) -> String {
        let found = self.lookup(var);

        if field.is_empty() {
            return match found {
                Some(text) => text.to_string(),
                None if var.eq_ignore_ascii_case("self") => self.owner.to_string(),
                None => String::new(),
            };
        }

        let target = match found {
            Some(text) => match self.resolve_value(text) {
                Ok(target) => target,
                Err(kind) => {
                    script_log(
                        self.trigger,
                        format_args!("attempt to access field '{field}' on {kind} variable '{var}'"),
                    );
                    return String::new();
                }
            },
            None if var.eq_ignore_ascii_case("self") => self.world.resolve(self.owner),
            None => return self.static_field(var, field, value),
        };

        self.entity_field(target, var, field, value)
    }

    /// Turn a variable's text into an entity reference.
    ///
    /// A bare number at or above `ROOM_ID_BASE` is always read as a UID, so
    /// a room vnum in that range cannot be named this way. Smaller numbers
    /// are room vnums. Anything else is a keyword searched near the owner.
    fn resolve_value(&self, text: &str) -> Result<EntityRef, &'static str> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty");
        }

        if let Some(uid) = Uid::parse(text) {
            return match self.world.resolve(uid) {
                EntityRef::None => Err("previously extracted UID"),
                target => Ok(target),
            };
        }

        if is_number(text) {
            let n = atoi(text);
            let target = match u64::try_from(n) {
                Ok(id) if id >= ROOM_ID_BASE => self.world.resolve(Uid::new(id)),
                _ => i32::try_from(n)
                    .ok()
                    .and_then(|vnum| self.world.room_by_vnum(vnum))
                    .map_or(EntityRef::None, |room| self.world.resolve(room.uid)),
            };
            return if target.is_none() { Err("non-UID") } else { Ok(target) };
        }

        match self.world.find_by_name(self.owner, text) {
            EntityRef::None => Err("non-UID"),
            target => Ok(target),
        }
    }

    fn static_field(&mut self, var: &str, field: &str, value: &str) -> String {
        let result = match var.to_ascii_lowercase().as_str() {
            "time" => self.time_field(field),
            "random" => Some(self.random_field(field)),
            "get" => self.get_field(field, value),
            "string" => string_field(field, value),
            _ => return String::new(),
        };
        result.unwrap_or_else(|| {
            script_log(self.trigger, format_args!("unknown {var} field '{field}'"));
            String::new()
        })
    }

    fn time_field(&self, field: &str) -> Option<String> {
        let now = self.world.time();
        let text = match field.to_ascii_lowercase().as_str() {
            "hour" => now.hours.to_string(),
            "day" => (now.day + 1).to_string(),
            "month" => (now.month + 1).to_string(),
            "year" => now.year.to_string(),
            "stamp" => now.stamp().to_string(),
            _ => return None,
        };
        Some(text)
    }

    fn random_field(&mut self, field: &str) -> String {
        let world = self.world;
        match field.to_ascii_lowercase().as_str() {
            "char" => {
                let Some(room) = world.room_of(self.owner) else {
                    return String::new();
                };
                let candidates: Vec<Uid> = room
                    .people
                    .iter()
                    .copied()
                    .filter(|&uid| uid != self.owner && world.can_see(self.owner, uid))
                    .collect();
                self.rng
                    .choose(&candidates)
                    .map(Uid::to_string)
                    .unwrap_or_default()
            }
            "room" => world
                .random_room(self.rng, None)
                .map(|uid| uid.to_string())
                .unwrap_or_default(),
            "room_in_zone" => {
                let zone = world.room_of(self.owner).map(|room| room.zone);
                world
                    .random_room(self.rng, zone)
                    .map(|uid| uid.to_string())
                    .unwrap_or_default()
            }
            other => {
                let high = atoi(other);
                if high > 0 {
                    self.rng.number(1, high).to_string()
                } else {
                    "0".to_string()
                }
            }
        }
    }

    fn get_field(&self, field: &str, value: &str) -> Option<String> {
        let world = self.world;
        let vnum = i32::try_from(atoi(value)).unwrap_or(-1);
        let text = match field.to_ascii_lowercase().as_str() {
            "obj_shortdesc" => world
                .object_prototype(vnum)
                .map(|p| p.short_desc)
                .unwrap_or_default(),
            "obj_noadesc" => world
                .object_prototype(vnum)
                .map(|p| strip_article(&p.short_desc).to_string())
                .unwrap_or_default(),
            "mob_shortdesc" => world
                .mobile_prototype(vnum)
                .map(|p| p.short_desc)
                .unwrap_or_default(),
            "obj_count" => world
                .object_prototype(vnum)
                .map_or(0, |p| p.count)
                .to_string(),
            "mob_count" => world
                .mobile_prototype(vnum)
                .map_or(0, |p| p.count)
                .to_string(),
            "room" => world
                .room_by_vnum(vnum)
                .map(|r| r.uid.to_string())
                .unwrap_or_default(),
            "people" => world
                .room_by_vnum(vnum)
                .map_or(0, |r| r.people.len())
                .to_string(),
            "opposite_dir" => Direction::from_name(value.trim())
                .map(|d| d.reverse().name().to_string())
                .unwrap_or_default(),
            "uidchar" => UID_SIGIL.to_string(),
            _ => return None,
        };
        Some(text)
    }
}

fn string_field(field: &str, value: &str) -> Option<String> {
    let text = match field.to_ascii_lowercase().as_str() {
        "reverse" => value.chars().rev().collect(),
        "length" => value.chars().count().to_string(),
        "tolower" => value.to_lowercase(),
        "toupper" => value.to_uppercase(),
        "cap" | "capitalize" => capitalize(value),
        "firstword" => split_word(value).0.to_string(),
        _ => return None,
    };
    Some(text)
}

fn strip_article(text: &str) -> &str {
    let (word, rest) = split_word(text);
    if ["a", "an", "the", "some"]
        .iter()
        .any(|article| word.eq_ignore_ascii_case(article))
        && !rest.is_empty()
    {
        rest
    } else {
        text
    }
}
