use std::ptr::NonNull;

use stackpool::{HEADER_SIZE, Pool};

fn log_alloc(pool: &Pool, addr: NonNull<u8>, size: usize) {
    println!("Requested {size} bytes of memory");
    println!("Received this address: {addr:?}, {} bytes used", pool.bytes_used());
}

fn main() -> stackpool::Result<()> {
    let mut pool: Pool = Pool::with_capacity(64)?;
    println!("Pool of {} bytes, headers take {HEADER_SIZE} bytes each", pool.capacity());

    let a = pool.allocate(10)?;
    log_alloc(&pool, a, 10);

    let b = pool.allocate(20)?;
    log_alloc(&pool, b, 20);

    // `a` is not on top of the stack, so it stays where it is.
    println!("Deallocating a out of order: reclaimed = {}", pool.deallocate(a));

    // Growing the top block happens in place.
    let b = pool.reallocate(Some(b), 24)?;
    println!("Grew b in place: {b:?}, {} bytes used", pool.bytes_used());

    if let Some(b) = b {
        println!("Deallocating b: reclaimed = {}", pool.deallocate(b));
    }
    println!("Deallocating a: reclaimed = {}", pool.deallocate(a));
    println!("Pool empty again: {} bytes used", pool.bytes_used());

    Ok(())
}
