mod args;
mod entry;

use elevator::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
