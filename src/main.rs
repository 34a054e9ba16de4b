fn main() -> anyhow::Result<()> {
    recipe_tui::cli::run()
}
