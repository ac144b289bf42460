//! Command tree
//!
//! Commands are declared as [`CommandNode`]s, turned into a clap [`Command`]
//! for parsing, then walked again to find the leaf that runs.

use std::ffi::OsString;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgMatches, Command};

use super::context::{Context, GlobalOptions, Invocation};
use super::flags::FlagSet;
use crate::error::AppError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy)]
pub struct Positional {
    pub name: &'static str,
    pub help: &'static str,
    pub required: bool,
    /// Takes every remaining argument, including ones that look like flags
    pub trailing: bool,
}

impl Positional {
    #[must_use]
    pub const fn required(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            required: true,
            trailing: false,
        }
    }

    #[must_use]
    pub const fn trailing(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            required: false,
            trailing: true,
        }
    }

    fn arg(&self) -> Arg {
        let arg = Arg::new(self.name)
            .help(self.help)
            .required(self.required)
            .value_parser(value_parser!(String));
        if self.trailing {
            arg.num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
        } else {
            arg
        }
    }
}

pub struct CommandNode {
    pub name: &'static str,
    pub about: &'static str,
    pub aliases: &'static [&'static str],
    pub flags: FlagSet,
    pub positionals: Vec<Positional>,
    pub children: Vec<CommandNode>,
    pub handler: Option<Arc<dyn CommandHandler>>,
}

impl CommandNode {
    #[must_use]
    pub fn group(name: &'static str, about: &'static str) -> Self {
        Self {
            name,
            about,
            aliases: &[],
            flags: FlagSet::new(),
            positionals: Vec::new(),
            children: Vec::new(),
            handler: None,
        }
    }

    #[must_use]
    pub fn leaf(name: &'static str, about: &'static str, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            handler: Some(handler),
            ..Self::group(name, about)
        }
    }

    #[must_use]
    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn positionals(mut self, positionals: &[Positional]) -> Self {
        self.positionals.extend_from_slice(positionals);
        self
    }

    #[must_use]
    pub fn child(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The clap definition of this node and everything below it. Flags of the
    /// root are global.
    #[must_use]
    pub fn to_clap(&self, root: bool) -> Command {
        let mut cmd = Command::new(self.name)
            .about(self.about)
            .aliases(self.aliases.iter().copied());

        if root {
            cmd = cmd.version(env!("CARGO_PKG_VERSION"));
        }
        for arg in self.flags.args(root) {
            cmd = cmd.arg(arg);
        }
        for positional in &self.positionals {
            cmd = cmd.arg(positional.arg());
        }
        for child in &self.children {
            cmd = cmd.subcommand(child.to_clap(false));
        }
        if !self.children.is_empty() {
            cmd = cmd.subcommand_required(true).arg_required_else_help(true);
        }
        cmd
    }

    /// Parse `argv` (program name first) against this tree and run the leaf
    /// command it selects. Arguments that are not valid UTF-8 are usage errors.
    ///
    /// # Errors
    /// Usage and flag errors before anything runs, otherwise whatever the
    /// command returns.
    pub async fn execute<I, T>(&self, ctx: &Context, argv: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.to_clap(true).try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                ctx.output.line(e.render().to_string().trim_end())?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let (node, leaf, path) = self.select(&matches)?;
        let handler = node.handler.as_ref().ok_or_else(|| {
            AppError::Construction(format!("`{}` has no handler", path.join(" ")))
        })?;

        // clap copies global values down to the selected sub-command
        let mut globals = self.flags.clone();
        globals.absorb(leaf)?;
        globals.check_required()?;

        let mut flags = node.flags.clone();
        flags.absorb(leaf)?;
        flags.check_required()?;

        let args = node
            .positionals
            .iter()
            .flat_map(|p| {
                leaf.get_many::<String>(p.name)
                    .into_iter()
                    .flatten()
                    .cloned()
            })
            .collect();

        let options = GlobalOptions::resolve(&globals, &ctx.settings)?;
        let inv = Invocation {
            path,
            flags,
            globals,
            args,
            options,
        };

        tracing::debug!(command = %inv.path.join(" "), "running command");
        handler.run(ctx, &inv).await
    }

    fn select<'m>(
        &self,
        matches: &'m ArgMatches,
    ) -> Result<(&CommandNode, &'m ArgMatches, Vec<String>), AppError> {
        let mut node = self;
        let mut leaf = matches;
        let mut path = Vec::new();

        while let Some((name, sub)) = leaf.subcommand() {
            node = node.find(name).ok_or_else(|| {
                AppError::Construction(format!("no command node for `{name}`"))
            })?;
            path.push(name.to_string());
            leaf = sub;
        }
        Ok((node, leaf, path))
    }
}

// -- Tests ---------------------------------------------------------------------
