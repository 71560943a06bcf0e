//! Basic example of using the One Move Left engine

use onemoveleft_core::{is_solvable, Generator, Goal, Grid, Session, Status};

fn main() {
    // Generate a level
    println!("Generating level 3...\n");
    let mut generator = Generator::new();
    let mut session = Session::start(&mut generator, 3);

    println!("Board:");
    println!("{}", session.grid());
    println!("Goal: {}", session.goal_text());
    println!("Moves: {}\n", session.moves_left());

    // Play the hint
    let hint = session.hint();
    match hint.solution {
        Some(moves) => {
            for direction in moves {
                let outcome = session
                    .apply_move(direction)
                    .expect("the hint replays from the level start");
                println!(
                    "{}: popped {} in {} steps (+{})",
                    direction, outcome.chain.total_popped, outcome.chain.steps, outcome.chain.score
                );
            }
        }
        None => println!("Generation fell back to an unproven level"),
    }

    if session.status() == Status::Won {
        println!("\nLevel complete with score {}", session.score());
    }

    // Parse a board from text
    println!("\n--- Solving a board from text ---\n");
    let grid = Grid::from_string(
        "AA.A
         BC.D
         CD.E
         DE.B",
    )
    .expect("valid board");
    println!("{}", grid);
    match is_solvable(&grid, &Goal::pop_total(3), 2) {
        Some(moves) => println!("Pop 3 tiles: {:?}", moves),
        None => println!("No solution within 2 moves"),
    }
}
