use gbload::error::AppResult;

fn main() -> AppResult<()> {
    gbload::entry::run()
}
