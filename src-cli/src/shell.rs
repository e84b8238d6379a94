//! Interactive shell over a session
//!
//! One command per line. Session actions report their own outcome through
//! the session's notification sink; the shell prints only what it reads back
//! (code, listings, status, written paths).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use inference::LLMStatus;
use weaver_engine::constants::{files, names};
use weaver_engine::{
    export, write_preview, CodeModel, Section, Session, Viewport, SANDBOX_PERMISSIONS,
};

use crate::terminal::LinePrompt;

const HELP: &str = "\
Commands:
  prompt <text>              set the prompt
  generate [text]            generate new code (optionally setting the prompt)
  edit [text]                edit the current code (optionally setting the prompt)
  show [section]             print the code, or one section
  set <section> <file>       load a file into a section
  clear                      empty the code and prompt
  save                       save or update the current project
  copy                       save as a new project
  checkpoint                 save the last AI result as a checkpoint
  list                       list saved projects
  load <id>                  load a project
  rename <id> <name>         rename a project
  delete <id>                delete a project
  zip [dir]                  export the code as a ZIP archive
  download <section> [dir]   write one section to a file
  preview [file] [viewport]  write a preview page (mobile, tablet, desktop, fill)
  status                     show session and model status
  help                       show this help
  quit                       leave";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Prompt(String),
    Generate(Option<String>),
    Edit(Option<String>),
    Show(Option<Section>),
    Set { section: Section, file: PathBuf },
    Clear,
    Save,
    Copy,
    Checkpoint,
    List,
    Load(String),
    Rename { id: String, name: String },
    Delete(String),
    Zip(Option<PathBuf>),
    Download { section: Section, dir: Option<PathBuf> },
    Preview { file: Option<PathBuf>, viewport: Viewport },
    Status,
    Help,
    Quit,
}

fn optional_text(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

fn required<'a>(value: Option<&'a str>, usage: &str) -> Result<&'a str, String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("usage: {}", usage))
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let (command, rest) = split_word(line.trim());

        Ok(match command {
            "" => ShellCommand::Empty,
            "prompt" => ShellCommand::Prompt(rest.to_string()),
            "generate" | "gen" => ShellCommand::Generate(optional_text(rest)),
            "edit" => ShellCommand::Edit(optional_text(rest)),
            "show" => ShellCommand::Show(match optional_text(rest) {
                Some(section) => Some(section.parse()?),
                None => None,
            }),
            "set" | "upload" => {
                let (section, file) = split_word(rest);
                let section = required(Some(section), "set <section> <file>")?.parse()?;
                let file = required(Some(file), "set <section> <file>")?;
                ShellCommand::Set {
                    section,
                    file: PathBuf::from(file),
                }
            }
            "clear" => ShellCommand::Clear,
            "save" => ShellCommand::Save,
            "copy" => ShellCommand::Copy,
            "checkpoint" | "cp" => ShellCommand::Checkpoint,
            "list" | "ls" => ShellCommand::List,
            "load" => ShellCommand::Load(required(Some(rest), "load <id>")?.to_string()),
            "rename" => {
                let (id, name) = split_word(rest);
                let id = required(Some(id), "rename <id> <name>")?;
                let name = required(Some(name), "rename <id> <name>")?;
                ShellCommand::Rename {
                    id: id.to_string(),
                    name: name.to_string(),
                }
            }
            "delete" | "rm" => ShellCommand::Delete(required(Some(rest), "delete <id>")?.to_string()),
            "zip" => ShellCommand::Zip(optional_text(rest).map(PathBuf::from)),
            "download" => {
                let (section, dir) = split_word(rest);
                let section = required(Some(section), "download <section> [dir]")?.parse()?;
                ShellCommand::Download {
                    section,
                    dir: optional_text(dir).map(PathBuf::from),
                }
            }
            "preview" => {
                let mut file = None;
                let mut viewport = Viewport::default();
                for arg in rest.split_whitespace() {
                    match arg.parse::<Viewport>() {
                        Ok(v) => viewport = v,
                        Err(_) => file = Some(PathBuf::from(arg)),
                    }
                }
                ShellCommand::Preview { file, viewport }
            }
            "status" => ShellCommand::Status,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        })
    }
}

/// Interactive loop state
pub struct Shell<'a, R> {
    session: &'a mut Session,
    model: &'a dyn CodeModel,
    input: LinePrompt<R>,
    export_dir: PathBuf,
    status: LLMStatus,
}

impl<'a, R: BufRead> Shell<'a, R> {
    pub fn new(
        session: &'a mut Session,
        model: &'a dyn CodeModel,
        input: LinePrompt<R>,
        export_dir: PathBuf,
        status: LLMStatus,
    ) -> Self {
        Self {
            session,
            model,
            input,
            export_dir,
            status,
        }
    }

    /// Read and execute commands until `quit` or end of input
    pub async fn run(&mut self) -> io::Result<()> {
        println!("Web Weaver ({} code). Type 'help' for commands.", self.session.variant());
        loop {
            print!("web-weaver> ");
            io::stdout().flush()?;

            let Some(line) = self.input.read_line()? else {
                println!();
                break;
            };
            match ShellCommand::parse(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.execute(command).await,
                Err(message) => eprintln!("{}", message),
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: ShellCommand) {
        // Session actions notify their own outcome
        let outcome = match command {
            ShellCommand::Empty | ShellCommand::Quit => Ok(()),
            ShellCommand::Prompt(text) => {
                self.session.set_prompt(text);
                Ok(())
            }
            ShellCommand::Generate(text) => {
                if let Some(text) = text {
                    self.session.set_prompt(text);
                }
                println!("Weaving...");
                self.session.generate(self.model).await
            }
            ShellCommand::Edit(text) => {
                if let Some(text) = text {
                    self.session.set_prompt(text);
                }
                println!("Reweaving...");
                self.session.edit(self.model).await
            }
            ShellCommand::Show(section) => {
                self.show(section);
                Ok(())
            }
            ShellCommand::Set { section, file } => self.session.upload_section(section, &file),
            ShellCommand::Clear => {
                self.session.clear();
                Ok(())
            }
            ShellCommand::Save => self.session.save(&mut self.input).map(|_| ()),
            ShellCommand::Copy => self.session.save_as_copy(&mut self.input).map(|_| ()),
            ShellCommand::Checkpoint => self.session.save_checkpoint(&mut self.input).map(|_| ()),
            ShellCommand::List => {
                self.list();
                Ok(())
            }
            ShellCommand::Load(id) => self.session.load_project(&id),
            ShellCommand::Rename { id, name } => self.session.rename_project(&id, &name),
            ShellCommand::Delete(id) => self.session.delete_project(&id),
            ShellCommand::Zip(dir) => {
                let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                let name = self
                    .session
                    .current_project()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| names::EXPORT_FALLBACK.to_string());
                self.report_path(export::write_archive(&dir, &name, self.session.code()))
            }
            ShellCommand::Download { section, dir } => {
                let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                self.report_path(export::write_section(&dir, self.session.code(), section))
            }
            ShellCommand::Preview { file, viewport } => {
                let path = file.unwrap_or_else(|| self.export_dir.join(files::PREVIEW));
                let written = write_preview(&path, self.session.code(), viewport)
                    .map(|()| path)
                    .map_err(Into::into);
                self.report_path(written)
            }
            ShellCommand::Status => {
                self.print_status();
                Ok(())
            }
            ShellCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            log::debug!("Command failed: {}", e);
        }
    }

    fn report_path(&self, written: weaver_engine::Result<PathBuf>) -> weaver_engine::Result<()> {
        match written {
            Ok(path) => {
                println!("Wrote {}", path.display());
                Ok(())
            }
            Err(e) => {
                eprintln!("[error] Export failed: {}", e);
                Err(e)
            }
        }
    }

    fn show(&self, only: Option<Section>) {
        let code = self.session.code();
        let sections: Vec<Section> = match only {
            Some(section) => vec![section],
            None => code.variant().sections().to_vec(),
        };
        for section in sections {
            match code.section(section) {
                Some(text) => println!("--- {} ---\n{}", section.label(), text),
                None => eprintln!("{} is not part of {} code", section.label(), code.variant()),
            }
        }
    }

    fn list(&self) {
        let projects = self.session.store().list();
        if projects.is_empty() {
            println!("No saved projects.");
            return;
        }
        let current = self.session.current_project_id();
        for project in projects {
            let marker = if current == Some(project.id.as_str()) { '*' } else { ' ' };
            println!("{} {}  {}", marker, project.id, project.name);
        }
    }

    fn print_status(&self) {
        let session = &*self.session;
        println!("Variant:     {}", session.variant());
        println!(
            "Backend:     {} ({})",
            self.status.backend,
            if self.status.ready { "ready" } else { "not ready" }
        );
        if let Some(url) = &self.status.url {
            println!("Server:      {}", url);
        }
        println!(
            "Project:     {}",
            session
                .current_project()
                .map(|p| format!("{} ({})", p.name, p.id))
                .unwrap_or_else(|| "none".to_string())
        );
        println!("Prompt:      {}", session.prompt());
        println!("Has code:    {}", session.code().has_code());
        println!("Checkpoint:  {}", session.can_create_checkpoint());
        println!("Projects:    {}", session.store().len());
        println!("Sandbox:     {}", SANDBOX_PERMISSIONS);
        println!("Exports to:  {}", self.export_dir.display());
    }
}
