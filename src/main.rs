fn main() {
    use concept_graph::cli::parse;
    let cli = parse();
    concept_graph::utils::logging::init_tracing(cli.verbose, cli.quiet);
    let code = concept_graph::app::run_cli(cli);
    if code != 0 { std::process::exit(code); }
}
