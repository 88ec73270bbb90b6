//! Interactive shell over the mapping store.
//!
//! Dispatch is an explicit static registry: one table entry per command,
//! looked up by name.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};

use lupine::{map_archive, map_text, MappingSource, MappingStore, MappingVersion};

use crate::archive::ZipSource;
use crate::remote::HttpFetch;
use crate::select;

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    run: fn(&mut Repl, Option<&str>) -> Result<()>,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        usage: "help [command]",
        summary: "Lists all commands, or shows the usage of one.",
        run: Repl::cmd_help,
    },
    CommandSpec {
        name: "yarnver",
        usage: "yarnver [game version]",
        summary: "Displays all available Yarn mapping versions, optionally only for one game version.",
        run: Repl::cmd_yarnver,
    },
    CommandSpec {
        name: "mapsrc",
        usage: "mapsrc <filename or yarn version string>",
        summary: "Selects a mapping source: a Tiny v1 file or a Yarn version to cache.",
        run: Repl::cmd_mapsrc,
    },
    CommandSpec {
        name: "mapstr",
        usage: "mapstr <string>",
        summary: "Maps the intermediary names in the given string.",
        run: Repl::cmd_mapstr,
    },
    CommandSpec {
        name: "mapfile",
        usage: "mapfile <filename>",
        summary: "Maps the intermediary names in the given file.",
        run: Repl::cmd_mapfile,
    },
    CommandSpec {
        name: "mapjar",
        usage: "mapjar <input filename> [output directory]",
        summary: "Maps the intermediary names in the given decompiled jar.",
        run: Repl::cmd_mapjar,
    },
    CommandSpec {
        name: "search",
        usage: "search <name>",
        summary: "Searches for a mapped, intermediary, or official (classes only) name.",
        run: Repl::cmd_search,
    },
    CommandSpec {
        name: "children",
        usage: "children <name>",
        summary: "Lists the nested classes, fields, and methods of a class.",
        run: Repl::cmd_children,
    },
    CommandSpec {
        name: "exit",
        usage: "exit",
        summary: "Leaves the shell.",
        run: Repl::cmd_exit,
    },
];

struct Repl {
    store: MappingStore,
    fetch: HttpFetch,
    output_dir: PathBuf,
    selected: Option<MappingVersion>,
    done: bool,
}

/// Runs the read-eval-print loop until `exit` or end of input.
pub fn run(config_dir: &Path, output_dir: &Path) -> Result<()> {
    info!("loading mapping database");
    let store = MappingStore::open(config_dir.join("mappings.db"))?;

    println!("lupine {} - interactive mode", env!("CARGO_PKG_VERSION"));
    println!("\"help\" for commands, \"exit\" to quit.");

    let mut repl = Repl {
        store,
        fetch: HttpFetch::default(),
        output_dir: output_dir.to_path_buf(),
        selected: None,
        done: false,
    };

    let stdin = io::stdin();
    while !repl.done {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        repl.dispatch(line.trim());
    }

    Ok(())
}

impl Repl {
    fn dispatch(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }

        let (name, args) = match line.split_once(' ') {
            Some((name, rest)) => (name, Some(rest.trim())),
            None => (line, None),
        };
        let name = name.to_lowercase();
        let args = args.filter(|rest| !rest.is_empty());

        match COMMANDS.iter().find(|spec| spec.name == name) {
            Some(spec) => {
                if let Err(err) = (spec.run)(self, args) {
                    error!("{err:#}");
                }
            }
            None => error!("unknown command; \"help\" lists all commands"),
        }
    }

    /// The currently selected mapping set, or `None` (with a hint) when no
    /// source has been picked yet.
    fn source(&self) -> Result<Option<Box<dyn MappingSource + '_>>> {
        let Some(version) = &self.selected else {
            error!("no mapping source selected; pick one with \"mapsrc\"");
            return Ok(None);
        };

        let source = self
            .store
            .get_mapping_set(version)?
            .with_context(|| format!("mapping set for {} is missing", version.version))?;
        Ok(Some(source))
    }

    fn cmd_help(&mut self, args: Option<&str>) -> Result<()> {
        match args {
            Some(name) => match COMMANDS.iter().find(|spec| spec.name == name) {
                Some(spec) => {
                    println!("{}", spec.usage);
                    println!("{}", spec.summary);
                }
                None => error!("unknown command {name}"),
            },
            None => {
                for spec in COMMANDS {
                    println!("{:32} {}", spec.usage, spec.summary);
                }
            }
        }

        Ok(())
    }

    fn cmd_exit(&mut self, _args: Option<&str>) -> Result<()> {
        self.done = true;
        Ok(())
    }

    fn cmd_yarnver(&mut self, args: Option<&str>) -> Result<()> {
        let fetch = &self.fetch;
        let mut versions = select::version_listing(fetch, &self.store)?;

        if let Some(game_version) = args {
            versions.retain(|v| select::matches_game_version(v, game_version));
        }

        // Group by game version, preserving listing order; newest build
        // first within each group.
        let mut groups: Vec<(String, Vec<MappingVersion>)> = Vec::new();
        for version in versions {
            match groups.iter_mut().find(|(game, _)| *game == version.game_version) {
                Some((_, list)) => list.push(version),
                None => groups.push((version.game_version.clone(), vec![version])),
            }
        }

        for (game_version, mut list) in groups {
            println!("{game_version}");
            list.sort_by(|a, b| b.build.cmp(&a.build));
            for version in list {
                println!("  {version}");
            }
        }

        Ok(())
    }

    fn cmd_mapsrc(&mut self, args: Option<&str>) -> Result<()> {
        let Some(target) = args else {
            error!("usage: mapsrc <filename or yarn version string>");
            return Ok(());
        };

        if target.ends_with(".tiny") {
            if !Path::new(target).exists() {
                bail!("mapping file \"{target}\" could not be found");
            }

            self.store.use_local_file(target)?;
            self.selected = Some(MappingVersion::local(target));
            info!("using mappings from \"{target}\"");
            return Ok(());
        }

        let listing = select::version_listing(&self.fetch, &self.store)?;
        let Some(version) = listing.iter().find(|v| v.version == target).cloned() else {
            bail!("could not find mapping version {target}");
        };

        select::select_version(&mut self.store, &self.fetch, &version)?;
        self.selected = Some(version);
        info!("using mappings from yarn {target}");

        Ok(())
    }

    fn cmd_mapstr(&mut self, args: Option<&str>) -> Result<()> {
        let Some(text) = args else {
            error!("usage: mapstr <string>");
            return Ok(());
        };
        let Some(source) = self.source()? else {
            return Ok(());
        };

        let mapped = map_text(&*source, text)?;
        println!("{}", mapped.text);

        Ok(())
    }

    fn cmd_mapfile(&mut self, args: Option<&str>) -> Result<()> {
        let Some(filename) = args else {
            error!("usage: mapfile <filename>");
            return Ok(());
        };
        let Some(source) = self.source()? else {
            return Ok(());
        };

        let input = Path::new(filename);
        let contents = std::fs::read_to_string(input)
            .with_context(|| format!("could not read \"{filename}\""))?;
        let mapped = map_text(&*source, &contents)?;

        let output = mapped_sibling(input);
        std::fs::write(&output, mapped.text)?;
        info!("wrote {}", output.display());
        crate::report_unresolved(&mapped.unresolved);

        Ok(())
    }

    fn cmd_mapjar(&mut self, args: Option<&str>) -> Result<()> {
        let parts: Vec<&str> = args.map(|a| a.split_whitespace().collect()).unwrap_or_default();
        if parts.is_empty() || parts.len() > 2 {
            error!("usage: mapjar <input filename> [output directory]");
            return Ok(());
        }

        let input = Path::new(parts[0]);
        if !input.exists() {
            bail!("input file \"{}\" does not exist", input.display());
        }

        let dest = resolve_output(&self.output_dir, parts.get(1).copied(), input);

        let Some(source) = self.source()? else {
            return Ok(());
        };

        let mut archive = ZipSource::open(input)?;
        let unresolved = map_archive(&*source, &mut archive, &dest)?;
        crate::report_unresolved(&unresolved);

        Ok(())
    }

    fn cmd_search(&mut self, args: Option<&str>) -> Result<()> {
        let Some(name) = args else {
            error!("usage: search <name>");
            return Ok(());
        };
        let Some(source) = self.source()? else {
            return Ok(());
        };

        let records = source.search(name)?;
        if records.is_empty() {
            warn!("no records named \"{name}\"");
        }
        for record in records {
            println!("{record}");
        }

        Ok(())
    }

    fn cmd_children(&mut self, args: Option<&str>) -> Result<()> {
        let Some(name) = args else {
            error!("usage: children <name>");
            return Ok(());
        };
        let Some(source) = self.source()? else {
            return Ok(());
        };

        let records = source.children(name)?;
        if records.is_empty() {
            warn!("no children found for \"{name}\"");
        }
        for record in records {
            println!("{record}");
        }

        Ok(())
    }
}

/// `dir/Foo.java` becomes `dir/Foo-mapped.java`.
fn mapped_sibling(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{stem}-mapped.{}", ext.to_string_lossy()),
        None => format!("{stem}-mapped"),
    };
    input.with_file_name(name)
}

/// `dir/sources.jar` yields an output directory `sources-mapped`.
pub(crate) fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{stem}-mapped"))
}

/// Resolves where mapped archive output goes: the explicitly requested
/// directory, or one named after the input, either way anchored under
/// `base`. An absolute explicit directory wins over `base`.
pub(crate) fn resolve_output(base: &Path, explicit: Option<&str>, input: &Path) -> PathBuf {
    let dir = match explicit {
        Some(dir) => PathBuf::from(dir),
        None => default_output_dir(input),
    };
    base.join(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_defaults_to_input_stem_under_the_base() {
        let dest = resolve_output(Path::new("/work/out"), None, Path::new("mod-sources.jar"));
        assert_eq!(dest, Path::new("/work/out/mod-sources-mapped"));
    }

    #[test]
    fn explicit_relative_output_is_anchored_under_the_base() {
        let dest = resolve_output(Path::new("/work/out"), Some("renamed"), Path::new("a.jar"));
        assert_eq!(dest, Path::new("/work/out/renamed"));
    }

    #[test]
    fn explicit_absolute_output_overrides_the_base() {
        let dest = resolve_output(Path::new("/work/out"), Some("/elsewhere"), Path::new("a.jar"));
        assert_eq!(dest, Path::new("/elsewhere"));
    }
}
