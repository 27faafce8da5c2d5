use minelogic::{EngineError, Game, GameState, Identity, Position};
use std::collections::HashSet;
use std::env;
use std::io::{self, Write};

fn main() {
    env_logger::init();

    match run_game() {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run_game() -> Result<(), EngineError> {
    let (width, height, mines) = parse_args();
    let mut game = Game::new(width, height, mines)?;
    // Flags are a pure UI affair; the engine never sees them.
    let mut flags: HashSet<Position> = HashSet::new();

    while game.state() == GameState::Playing {
        print_board(&game, &flags);

        if let Some((pos, action)) = get_user_input(&game) {
            match action {
                Action::Flag => {
                    if !flags.remove(&pos) {
                        flags.insert(pos);
                    }
                }
                Action::Reveal => {
                    if flags.contains(&pos) {
                        println!("Cell is flagged; unflag it first");
                        continue;
                    }
                    if let Err(e) = game.reveal(pos) {
                        println!("Error: {}", e);
                        continue;
                    }
                }
            }
        }
    }

    if game.state() == GameState::Lost {
        game.disclose_mines()?;
    }
    print_board(&game, &flags);
    match game.state() {
        GameState::Won => println!("Congratulations! You won!"),
        GameState::Lost => println!("Game Over!"),
        GameState::Playing => unreachable!(),
    }

    Ok(())
}

enum Action {
    Reveal,
    Flag,
}

fn parse_args() -> (usize, usize, usize) {
    let mut args = env::args().skip(1);
    let width = args.next().and_then(|a| a.parse().ok()).unwrap_or(9);
    let height = args.next().and_then(|a| a.parse().ok()).unwrap_or(9);
    let mines = args.next().and_then(|a| a.parse().ok()).unwrap_or(10);
    (width, height, mines)
}

fn print_board(game: &Game, flags: &HashSet<Position>) {
    let (width, height) = game.dimensions();

    // Print column numbers
    print!("  ");
    for x in 0..width {
        print!("{} ", x % 10);
    }
    println!();

    // Print rows
    for y in 0..height {
        print!("{} ", y % 10);
        for x in 0..width {
            let pos = Position::new(x as i32, y as i32);
            let cell = game.cell(pos);
            if flags.contains(&pos) && !cell.revealed {
                print!("⚑ ");
            } else if cell.revealed && cell.identity == Identity::Mine {
                print!("X ");
            } else if cell.revealed && cell.number == 0 {
                print!("  ");
            } else if cell.revealed {
                print!("{} ", cell.number);
            } else if game.state() == GameState::Lost && cell.identity == Identity::Mine {
                print!("* ");
            } else {
                print!("□ ");
            }
        }
        println!();
    }
    println!("Mines left to find: {}", game.grid().missing_mines());
}

fn get_user_input(game: &Game) -> Option<(Position, Action)> {
    print!("Enter command (x y [r/f]): ");
    io::stdout().flush().ok()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;

    let mut parts = input.split_whitespace();

    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let action = parts.next()?.chars().next()?;

    let pos = Position::new(x, y);

    let (width, height) = game.dimensions();
    if pos.x < 0 || pos.y < 0 || pos.x >= width as i32 || pos.y >= height as i32 {
        println!("Position out of bounds");
        return None;
    }

    let action = match action {
        'r' => Some(Action::Reveal),
        'f' => Some(Action::Flag),
        _ => {
            println!("Invalid action. Use 'r' to reveal or 'f' to flag");
            None
        }
    }?;

    Some((pos, action))
}
