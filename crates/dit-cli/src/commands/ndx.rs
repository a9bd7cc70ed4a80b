use crate::cli::{NdxArgs, NdxCommands, NdxEditArgs, NdxFormatArgs, NdxShowArgs};
use crate::commands::{read_input, write_output};
use crate::error::{CliError, Result};
use dit_core::core::formats::ndx::IndexGroups;
use dit_core::core::utils::outfile;
use std::fs;
use tracing::{info, warn};

pub fn run(args: NdxArgs) -> Result<()> {
    match args.command {
        NdxCommands::Show(args) => show(args),
        NdxCommands::Format(args) => format(args),
        NdxCommands::Rm(args) => edit(args, EditKind::Remove),
        NdxCommands::Keep(args) => edit(args, EditKind::Keep),
    }
}

enum EditKind {
    Remove,
    Keep,
}

fn show(args: NdxShowArgs) -> Result<()> {
    let groups: IndexGroups = read_input(&args.input)?;
    for (ordinal, group) in groups.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>8} atoms",
            ordinal + 1,
            group.name,
            group.indexes.len()
        );
    }
    Ok(())
}

fn format(args: NdxFormatArgs) -> Result<()> {
    let groups: IndexGroups = read_input(&args.input)?;
    let text = groups.format_with_columns(args.row_width);
    match args.output {
        Some(output) => {
            let target = outfile::deconflict(&output);
            fs::write(&target, text)?;
            info!("Formatted index written to {:?}", &target);
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn edit(args: NdxEditArgs, kind: EditKind) -> Result<()> {
    let mut groups: IndexGroups = read_input(&args.input)?;
    for name in &args.groups {
        if !groups.contains(name) {
            return Err(CliError::Argument(format!(
                "group '{}' is not in {:?}",
                name, args.input
            )));
        }
    }

    match kind {
        EditKind::Remove => {
            for name in &args.groups {
                groups.remove(name);
            }
        }
        EditKind::Keep => groups.keep_only(&args.groups),
    }
    if groups.is_empty() {
        warn!("No groups are left; writing an empty index file.");
    }

    write_output(&groups, &args.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const SAMPLE: &str = "[ System ]
1 2 3 4 5 6
[ Protein ]
1 2 3
[ SOL ]
4 5 6
";

    fn edit_args(input: PathBuf, groups: &[&str], output: PathBuf) -> NdxEditArgs {
        NdxEditArgs {
            input,
            groups: groups.iter().map(|s| s.to_string()).collect(),
            output,
        }
    }

    #[test]
    fn rm_drops_only_the_named_groups() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("index.ndx");
        fs::write(&input, SAMPLE).unwrap();
        let output = dir.path().join("out.ndx");

        edit(edit_args(input, &["SOL"], output.clone()), EditKind::Remove).unwrap();

        let written: IndexGroups = read_input(&output).unwrap();
        assert_eq!(written.names().collect::<Vec<_>>(), vec!["System", "Protein"]);
    }

    #[test]
    fn keep_retains_only_the_named_groups() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("index.ndx");
        fs::write(&input, SAMPLE).unwrap();
        let output = dir.path().join("out.ndx");

        edit(edit_args(input, &["Protein"], output.clone()), EditKind::Keep).unwrap();

        let written: IndexGroups = read_input(&output).unwrap();
        assert_eq!(written.names().collect::<Vec<_>>(), vec!["Protein"]);
        assert_eq!(written.get("Protein").unwrap().indexes, vec![1, 2, 3]);
    }

    #[test]
    fn editing_an_unknown_group_is_rejected_before_writing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("index.ndx");
        fs::write(&input, SAMPLE).unwrap();
        let output = dir.path().join("out.ndx");

        let result = edit(
            edit_args(input, &["Membrane"], output.clone()),
            EditKind::Remove,
        );
        assert!(matches!(result, Err(CliError::Argument(_))));
        assert!(!output.exists());
    }

    #[test]
    fn format_reflows_to_the_requested_row_width() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("index.ndx");
        fs::write(&input, SAMPLE).unwrap();
        let output = dir.path().join("narrow.ndx");

        let args = NdxFormatArgs {
            input,
            row_width: 2,
            output: Some(output.clone()),
        };
        format(args).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[ System ]");
        assert_eq!(lines[1], "   1    2");
        assert_eq!(lines[2], "   3    4");
    }
}
