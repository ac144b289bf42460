//! Flag registry
//!
//! Every command declares its options in a [`FlagSet`]. A flag is a typed
//! value cell plus an "explicitly set" bit. An alias is a second, hidden
//! spelling that owns no storage: reads and writes go to its canonical flag,
//! and setting it marks the canonical flag as set, so required-flag checks
//! keyed on the canonical name see values given under the alias.
//!
//! Parsing itself is done by clap. [`FlagSet::args`] turns the registry into
//! clap arguments without clap-side defaults, and [`FlagSet::absorb`] copies
//! back only the values whose source is the command line.

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    String,
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Int(i64),
}

impl FlagValue {
    fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::String(_) => FlagKind::String,
            FlagValue::Int(_) => FlagKind::Int,
        }
    }

    fn parse(kind: FlagKind, spelling: &str, raw: &str) -> Result<Self, AppError> {
        let invalid = |reason: &str| AppError::InvalidFlag {
            name: spelling.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        match kind {
            FlagKind::Bool => match raw {
                "true" | "1" => Ok(FlagValue::Bool(true)),
                "false" | "0" => Ok(FlagValue::Bool(false)),
                _ => Err(invalid("expected true or false")),
            },
            FlagKind::Int => raw
                .trim()
                .parse()
                .map(FlagValue::Int)
                .map_err(|_| invalid("expected a whole number")),
            FlagKind::String => Ok(FlagValue::String(raw.to_string())),
        }
    }

    /// The value as it would be typed on the command line
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::String(s) => s.clone(),
            FlagValue::Int(i) => i.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flag {
    name: &'static str,
    short: Option<char>,
    usage: String,
    default: FlagValue,
    value: FlagValue,
    changed: bool,
    required: bool,
}

impl Flag {
    fn new(name: &'static str, default: FlagValue, usage: &str) -> Self {
        Self {
            name,
            short: None,
            usage: usage.to_string(),
            value: default.clone(),
            default,
            changed: false,
            required: false,
        }
    }

    #[must_use]
    pub fn bool(name: &'static str, usage: &str) -> Self {
        Self::new(name, FlagValue::Bool(false), usage)
    }

    #[must_use]
    pub fn string(name: &'static str, default: &str, usage: &str) -> Self {
        Self::new(name, FlagValue::String(default.to_string()), usage)
    }

    #[must_use]
    pub fn int(name: &'static str, default: i64, usage: &str) -> Self {
        Self::new(name, FlagValue::Int(default), usage)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }
}

#[derive(Debug, Clone)]
struct Alias {
    name: &'static str,
    target: usize,
    changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
    aliases: Vec<Alias>,
}

impl FlagSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canonical flag.
    ///
    /// # Errors
    /// Fails with a construction error if the name is already taken.
    pub fn add(&mut self, flag: Flag) -> Result<(), AppError> {
        if self.contains(flag.name) {
            return Err(AppError::Construction(format!(
                "flag --{} registered twice",
                flag.name
            )));
        }
        self.flags.push(flag);
        Ok(())
    }

    /// Register `alias` as a hidden second spelling of `canonical`.
    ///
    /// # Errors
    /// Fails with a construction error if `canonical` does not exist or
    /// `alias` is already taken. Both are mistakes in the command definition,
    /// never in user input.
    pub fn register_alias(
        &mut self,
        canonical: &'static str,
        alias: &'static str,
    ) -> Result<(), AppError> {
        let target = self
            .flags
            .iter()
            .position(|f| f.name == canonical)
            .ok_or_else(|| {
                AppError::Construction(format!(
                    "cannot alias --{alias}: no flag named --{canonical}"
                ))
            })?;

        if self.contains(alias) {
            return Err(AppError::Construction(format!(
                "cannot alias --{alias}: name already registered"
            )));
        }

        self.aliases.push(Alias {
            name: alias,
            target,
            changed: false,
        });
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    // Canonical index, plus the alias index when `name` is an alias
    fn resolve(&self, name: &str) -> Option<(usize, Option<usize>)> {
        if let Some(i) = self.flags.iter().position(|f| f.name == name) {
            return Some((i, None));
        }
        self.aliases
            .iter()
            .position(|a| a.name == name)
            .map(|a| (self.aliases[a].target, Some(a)))
    }

    /// Set a flag from its command-line text, under any of its spellings.
    ///
    /// # Errors
    /// Fails if the flag is unknown or the text does not parse as the flag's type.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), AppError> {
        let (index, alias) = self
            .resolve(name)
            .ok_or_else(|| AppError::Error(format!("unknown flag --{name}")))?;

        let flag = &mut self.flags[index];
        flag.value = FlagValue::parse(flag.kind(), name, raw)?;
        flag.changed = true;

        if let Some(a) = alias {
            self.aliases[a].changed = true;
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.resolve(name).map(|(i, _)| &self.flags[i].value)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some(FlagValue::Bool(true)))
    }

    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FlagValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(FlagValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Whether this exact spelling was given on the command line
    #[must_use]
    pub fn changed(&self, name: &str) -> bool {
        match self.resolve(name) {
            Some((_, Some(a))) => self.aliases[a].changed,
            Some((i, None)) => self.flags[i].changed,
            None => false,
        }
    }

    /// Whether the user supplied this option under any of its spellings
    #[must_use]
    pub fn was_set_via_canonical_or_alias(&self, name: &str) -> bool {
        let Some((index, _)) = self.resolve(name) else {
            return false;
        };
        self.flags[index].changed
            || self
                .aliases
                .iter()
                .any(|a| a.target == index && a.changed)
    }

    /// Help text of a flag, annotated with its aliases
    #[must_use]
    pub fn usage(&self, name: &str) -> Option<String> {
        let (index, _) = self.resolve(name)?;
        let flag = &self.flags[index];
        let aliases: Vec<String> = self
            .aliases
            .iter()
            .filter(|a| a.target == index)
            .map(|a| format!("--{}", a.name))
            .collect();

        let mut usage = flag.usage.clone();
        match &flag.default {
            FlagValue::String(s) if !s.is_empty() => usage.push_str(&format!(" [default: {s}]")),
            FlagValue::Int(i) if *i != 0 => usage.push_str(&format!(" [default: {i}]")),
            _ => {}
        }
        if !aliases.is_empty() {
            usage.push_str(&format!(" (alias: {})", aliases.join(", ")));
        }
        Some(usage)
    }

    fn spellings(&self, index: usize) -> String {
        let aliases: Vec<String> = self
            .aliases
            .iter()
            .filter(|a| a.target == index)
            .map(|a| format!("--{}", a.name))
            .collect();
        let canonical = format!("--{}", self.flags[index].name);
        if aliases.is_empty() {
            canonical
        } else {
            format!("{canonical} (or {})", aliases.join(", "))
        }
    }

    /// Check that every required flag was given under some spelling.
    ///
    /// # Errors
    /// Returns [`AppError::MissingFlag`] for the first missing flag.
    pub fn check_required(&self) -> Result<(), AppError> {
        for (index, flag) in self.flags.iter().enumerate() {
            if flag.required && !self.was_set_via_canonical_or_alias(flag.name) {
                return Err(AppError::MissingFlag(self.spellings(index)));
            }
        }
        Ok(())
    }

    /// Rebuild command-line arguments for exactly the flags the user set,
    /// always under their canonical names. Defaults are never included.
    #[must_use]
    pub fn explicit_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for flag in &self.flags {
            if !self.was_set_via_canonical_or_alias(flag.name) {
                continue;
            }
            match &flag.value {
                FlagValue::Bool(true) => args.push(format!("--{}", flag.name)),
                FlagValue::Bool(false) => args.push(format!("--{}=false", flag.name)),
                value => {
                    args.push(format!("--{}", flag.name));
                    args.push(value.render());
                }
            }
        }
        args
    }

    /// Query-string pairs for the given flags that were set, with dashes
    /// turned into underscores
    #[must_use]
    pub fn query_pairs(&self, names: &[&str]) -> Vec<(String, String)> {
        names
            .iter()
            .filter(|name| self.was_set_via_canonical_or_alias(name))
            .filter_map(|name| {
                self.get(name)
                    .map(|value| (name.replace('-', "_"), value.render()))
            })
            .collect()
    }

    /// clap arguments for every spelling. Aliases are hidden.
    #[must_use]
    pub fn args(&self, global: bool) -> Vec<Arg> {
        let mut args = Vec::new();
        for flag in &self.flags {
            let usage = self.usage(flag.name).unwrap_or_default();
            let mut arg = clap_arg(flag.name, flag.kind(), usage, global);
            if let Some(short) = flag.short {
                arg = arg.short(short);
            }
            args.push(arg);
        }
        for alias in &self.aliases {
            let target = &self.flags[alias.target];
            let usage = format!("Alias for --{}", target.name);
            args.push(clap_arg(alias.name, target.kind(), usage, global).hide(true));
        }
        args
    }

    /// Copy the values clap saw on the command line into the registry.
    ///
    /// # Errors
    /// Fails if a value does not parse as the flag's type.
    pub fn absorb(&mut self, matches: &ArgMatches) -> Result<(), AppError> {
        let names: Vec<&'static str> = self
            .flags
            .iter()
            .map(|f| f.name)
            .chain(self.aliases.iter().map(|a| a.name))
            .collect();

        for name in names {
            if matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(raw) = matches.get_one::<String>(name) {
                let raw = raw.clone();
                self.set(name, &raw)?;
            }
        }
        Ok(())
    }
}

fn clap_arg(name: &'static str, kind: FlagKind, usage: String, global: bool) -> Arg {
    let arg = Arg::new(name)
        .long(name)
        .help(usage)
        .global(global)
        .action(ArgAction::Set)
        .value_parser(value_parser!(String));

    match kind {
        // `--yes` or `--yes=false`; requiring `=` keeps `--yes transfers` from
        // swallowing the next word
        FlagKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_name("BOOL"),
        FlagKind::Int => arg.value_name("N"),
        FlagKind::String => arg.value_name("VALUE"),
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use clap::Command;

    use super::*;

    fn registry() -> FlagSet {
        let mut flags = FlagSet::new();
        flags
            .add(Flag::string("account", "", "Account to report on").required())
            .unwrap();
        flags.add(Flag::int("limit", 20, "Results per page")).unwrap();
        flags.add(Flag::bool("yes", "Skip prompts")).unwrap();
        flags.register_alias("account", "account-id").unwrap();
        flags.register_alias("limit", "page-size").unwrap();
        flags
    }

    fn parse(flags: &mut FlagSet, argv: &[&str]) -> Result<(), AppError> {
        let mut cmd = Command::new("test");
        for arg in flags.args(false) {
            cmd = cmd.arg(arg);
        }
        let matches = cmd.try_get_matches_from(argv)?;
        flags.absorb(&matches)
    }

    #[test]
    fn alias_writes_canonical_value_and_set_bit() {
        // Arrange
        let mut flags = registry();

        // Act
        flags.set("page-size", "50").unwrap();

        // Assert
        assert_eq!(flags.get_int("limit"), Some(50));
        assert!(flags.was_set_via_canonical_or_alias("limit"));
        assert!(flags.changed("limit"));
        assert!(flags.changed("page-size"));
    }

    #[test]
    fn required_flag_is_satisfied_by_alias() {
        // Arrange
        let mut flags = registry();

        // Act
        parse(&mut flags, &["test", "--account-id", "acc_1"]).unwrap();

        // Assert
        assert!(flags.check_required().is_ok());
        assert_eq!(flags.get_string("account"), Some("acc_1"));
    }

    #[test]
    fn missing_required_flag_names_every_spelling() {
        let flags = registry();

        let err = flags.check_required().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Required flag --account (or --account-id) not set"
        );
    }

    #[test]
    fn alias_to_unknown_flag_is_a_construction_error() {
        let mut flags = registry();

        let err = flags.register_alias("nope", "also-nope").unwrap_err();

        assert!(matches!(err, AppError::Construction(_)));
    }

    #[test]
    fn duplicate_alias_is_a_construction_error() {
        let mut flags = registry();

        let err = flags.register_alias("limit", "account").unwrap_err();

        assert!(matches!(err, AppError::Construction(_)));
    }

    #[test]
    fn usage_mentions_alias() {
        let flags = registry();

        let usage = flags.usage("limit").unwrap();

        assert_eq!(usage, "Results per page [default: 20] (alias: --page-size)");
    }

    #[test]
    fn aliases_are_hidden_from_help() {
        let flags = registry();

        let args = flags.args(false);
        let hidden: Vec<&str> = args
            .iter()
            .filter(|a| a.is_hide_set())
            .map(|a| a.get_id().as_str())
            .collect();

        assert_eq!(hidden, vec!["account-id", "page-size"]);
    }

    #[test]
    fn bool_flags_take_bare_and_explicit_false_forms() {
        // Arrange
        let mut bare = registry();
        let mut negated = registry();

        // Act
        parse(&mut bare, &["test", "--yes"]).unwrap();
        parse(&mut negated, &["test", "--yes=false"]).unwrap();

        // Assert
        assert!(bare.get_bool("yes"));
        assert!(!negated.get_bool("yes"));
        assert!(negated.was_set_via_canonical_or_alias("yes"));
    }

    #[test]
    fn explicit_args_skip_unset_defaults() {
        // Arrange
        let mut flags = registry();
        parse(&mut flags, &["test", "--account-id", "acc_1", "--yes"]).unwrap();

        // Act
        let args = flags.explicit_args();

        // Assert
        assert_eq!(args, vec!["--account", "acc_1", "--yes"]);
        assert!(!args.iter().any(|a| a == "--limit"));
    }

    #[test]
    fn explicit_false_is_forwarded() {
        let mut flags = registry();
        flags.set("yes", "false").unwrap();

        assert_eq!(flags.explicit_args(), vec!["--yes=false"]);
    }

    #[test]
    fn bad_int_names_the_spelling_used() {
        let mut flags = registry();

        let err = flags.set("page-size", "lots").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid value \"lots\" for --page-size: expected a whole number"
        );
    }

    #[test]
    fn query_pairs_only_include_set_flags() {
        let mut flags = registry();
        flags.set("account-id", "acc_9").unwrap();

        let pairs = flags.query_pairs(&["account", "limit"]);

        assert_eq!(pairs, vec![("account".to_string(), "acc_9".to_string())]);
    }
}
