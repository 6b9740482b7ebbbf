use color_eyre::{eyre::eyre, Result};
use spkgenv_core::{
    classify, generate, list_packages, ClassifyRequest, CommandContext, CommandGroup, CommandInfo,
    ExecutionOutcome, GenerateRequest, ListRequest, SourceTree,
};

use crate::cli::{ClassifyArgs, CommandGroupCli, GenerateArgs, ListArgs, SpkgenvCli};

pub fn dispatch_command(
    ctx: &CommandContext,
    cli: &SpkgenvCli,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    let tree = source_tree(cli);
    match &cli.command {
        CommandGroupCli::Generate(args) => {
            let info = CommandInfo::new(CommandGroup::Generate, "generate");
            let request = generate_request_from_args(tree, args);
            core_call(info, || generate(ctx, &request))
        }
        CommandGroupCli::List(args) => {
            let info = CommandInfo::new(CommandGroup::List, "list");
            let request = list_request_from_args(tree, args);
            core_call(info, || list_packages(ctx, &request))
        }
        CommandGroupCli::Classify(ClassifyArgs { ecosystem }) => {
            let info = CommandInfo::new(CommandGroup::Classify, "classify");
            let request = ClassifyRequest {
                tree,
                ecosystem: ecosystem.clone(),
            };
            core_call(info, || classify(ctx, &request))
        }
    }
}

fn core_call<F>(info: CommandInfo, f: F) -> Result<(CommandInfo, ExecutionOutcome)>
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    let outcome = f().map_err(|err| eyre!("{err:?}"))?;
    Ok((info, outcome))
}

fn source_tree(cli: &SpkgenvCli) -> SourceTree {
    SourceTree {
        sage_root: cli.sage_root.clone(),
        pkgs: cli.pkgs.clone(),
    }
}

fn generate_request_from_args(tree: SourceTree, args: &GenerateArgs) -> GenerateRequest {
    let mut request = GenerateRequest::new(tree);
    request.ecosystem = args.ecosystem.clone();
    if !args.python.is_empty() {
        request.python_versions = args.python.clone();
    }
    request.translator = args.translator.clone();
    request.dry_run = args.dry_run;
    request
}

fn list_request_from_args(tree: SourceTree, args: &ListArgs) -> ListRequest {
    ListRequest {
        tree,
        type_filters: args.types.clone(),
        has_files: args.has_file.clone(),
        no_files: args.no_file.clone(),
        exclude: args.exclude.clone(),
    }
}
