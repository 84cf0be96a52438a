use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("wirebound {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: wirebound");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "target_triple: {}",
        option_env!("WIREBOUND_TARGET_TRIPLE").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("WIREBOUND_BUILD_PROFILE").unwrap_or("unknown")
    );

    Ok(SUCCESS)
}
