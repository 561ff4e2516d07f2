use warden_service::auth::password::hash_password;

fn main() {
    let mut args = std::env::args().skip(1);
    let (Some(username), Some(password)) = (args.next(), args.next()) else {
        eprintln!("usage: hash_password <username> <password>");
        std::process::exit(2);
    };

    if username.contains(':') {
        eprintln!("Username must not contain ':'");
        std::process::exit(2);
    }

    match hash_password(&password) {
        Ok(hash) => {
            println!("{username}:{hash}");
        }
        Err(err) => {
            eprintln!("Failed to hash password: {err}");
            std::process::exit(1);
        }
    }
}
