use std::collections::HashMap;
use std::io::Write;

use anyhow::{Result, anyhow, bail};
use prefpop_core::Completion;
use tracing::info;

use super::{Session, print_catalog, print_help, print_table, resolve_prefecture};
use crate::client::PopulationApi;

pub struct Context<'a> {
    session: &'a mut Session,
    api: &'a dyn PopulationApi,
    out: &'a mut dyn Write,
    exit_requested: bool,
}

impl<'a> Context<'a> {
    pub fn new(session: &'a mut Session, api: &'a dyn PopulationApi, out: &'a mut dyn Write) -> Self {
        Self {
            session,
            api,
            out,
            exit_requested: false,
        }
    }

    pub fn session(&self) -> &Session {
        &*self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut *self.session
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

pub struct Args<'a> {
    tokens: Vec<&'a str>,
    index: usize,
}

impl<'a> Args<'a> {
    pub fn new(tokens: Vec<&'a str>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn next(&mut self) -> Option<&'a str> {
        if self.index >= self.tokens.len() {
            return None;
        }
        let value = self.tokens[self.index];
        self.index += 1;
        Some(value)
    }

    pub fn next_required(&mut self, message: &str) -> Result<&'a str> {
        self.next().ok_or_else(|| anyhow!(message.to_owned()))
    }
}

pub trait Command {
    fn name() -> &'static str;
    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()>;
}

type CommandFn = for<'a, 'b> fn(&mut Context<'a>, Args<'b>) -> Result<()>;

pub struct CommandRegistry {
    handlers: HashMap<&'static str, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: Command>(&mut self) {
        let name = C::name();
        if self.handlers.insert(name, C::execute).is_some() {
            panic!("重複したコマンド登録です: {name}");
        }
    }

    pub fn dispatch(&self, command: &str, ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        if let Some(handler) = self.handlers.get(command) {
            handler(ctx, args)
        } else {
            bail!("未対応のコマンドです: {command}. help で一覧を確認してください。");
        }
    }

    pub fn execute_input(&self, ctx: &mut Context<'_>, input: &str) -> Result<()> {
        let mut parts = input.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(anyhow!("コマンドが指定されていません。"));
        };
        let command_name = head.to_ascii_lowercase();
        let args = Args::new(parts.collect());
        self.dispatch(command_name.as_str(), ctx, args)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register::<HelpCommand>();
        registry.register::<HelpAliasCommand>();
        registry.register::<ListCommand>();
        registry.register::<ListAliasCommand>();
        registry.register::<AddCommand>();
        registry.register::<RemoveCommand>();
        registry.register::<RemoveAliasCommand>();
        registry.register::<TableCommand>();
        registry.register::<JsonCommand>();
        registry.register::<QuitCommand>();
        registry.register::<ExitCommand>();
        registry
    }
}

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name() -> &'static str {
        "help"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_help(ctx.out())
    }
}

pub struct HelpAliasCommand;

impl Command for HelpAliasCommand {
    fn name() -> &'static str {
        "?"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        HelpCommand::execute(ctx, args)
    }
}

pub struct ListCommand;

impl Command for ListCommand {
    fn name() -> &'static str {
        "list"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_catalog(&mut *ctx.out, &*ctx.session)
    }
}

pub struct ListAliasCommand;

impl Command for ListAliasCommand {
    fn name() -> &'static str {
        "ls"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        ListCommand::execute(ctx, args)
    }
}

pub struct AddCommand;

impl Command for AddCommand {
    fn name() -> &'static str {
        "add"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("追加する都道府県を指定してください。")?;
        let prefecture = resolve_prefecture(ctx.session(), token)?.clone();
        if ctx.session().tracker().is_selected(prefecture.code) {
            writeln!(ctx.out(), "{} は既に選択されています。", prefecture.name)?;
            return Ok(());
        }

        let Some(ticket) = ctx.session_mut().tracker_mut().toggle(&prefecture, true) else {
            return Ok(());
        };
        let outcome = ctx.api.total_population(prefecture.code);
        match ctx.session_mut().tracker_mut().complete(ticket, outcome) {
            Completion::Applied => {
                info!(code = %prefecture.code, name = %prefecture.name, "系列を追加");
                writeln!(ctx.out(), "{} を追加しました。", prefecture.name)?;
                Ok(())
            }
            Completion::Stale => Ok(()),
            Completion::Failed(err) => bail!(
                "{} の人口データを取得できませんでした: {}",
                prefecture.name,
                err
            ),
        }
    }
}

pub struct RemoveCommand;

impl Command for RemoveCommand {
    fn name() -> &'static str {
        "remove"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("除外する都道府県を指定してください。")?;
        let prefecture = resolve_prefecture(ctx.session(), token)?.clone();
        if !ctx.session().tracker().is_selected(prefecture.code) {
            writeln!(ctx.out(), "{} は選択されていません。", prefecture.name)?;
            return Ok(());
        }
        ctx.session_mut().tracker_mut().toggle(&prefecture, false);
        writeln!(ctx.out(), "{} を除外しました。", prefecture.name)?;
        Ok(())
    }
}

pub struct RemoveAliasCommand;

impl Command for RemoveAliasCommand {
    fn name() -> &'static str {
        "rm"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        RemoveCommand::execute(ctx, args)
    }
}

pub struct TableCommand;

impl Command for TableCommand {
    fn name() -> &'static str {
        "table"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        let table = ctx.session().table();
        print_table(ctx.out(), &table)
    }
}

pub struct JsonCommand;

impl Command for JsonCommand {
    fn name() -> &'static str {
        "json"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        let table = ctx.session().table();
        let json = serde_json::to_string_pretty(table.rows())?;
        writeln!(ctx.out(), "{json}")?;
        Ok(())
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name() -> &'static str {
        "quit"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        writeln!(ctx.out(), "終了します。")?;
        ctx.exit_requested = true;
        Ok(())
    }
}

pub struct ExitCommand;

impl Command for ExitCommand {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        QuitCommand::execute(ctx, args)
    }
}
