//! Pool backed by whole pages mapped straight from the OS.

use stackpool::{Pages, Pool};

fn main() -> stackpool::Result<()> {
    println!("Page size: {} bytes", Pages::page_size());

    let mut pool: Pool<'_, Pages> = Pool::new();
    pool.initialize(1000)?;
    println!(
        "Capacity {} bytes, {:?} bytes mapped",
        pool.capacity(),
        Pages::mapped_len(pool.capacity())
    );

    let block1 = pool.allocate(4)?;
    println!("{block1:?}");
    let block2 = pool.allocate(4)?;
    println!("{block2:?}");

    println!("Deallocating block2");
    pool.deallocate(block2);

    let block3 = pool.allocate(4)?;
    println!("Should be block2 addr {block3:?}");

    pool.deinitialize();

    Ok(())
}
