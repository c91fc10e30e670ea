//! Per-frame scratch memory: allocate freely during a frame, reset at the end.

use stackpool::{Arena, Pool};

fn main() -> stackpool::Result<()> {
    // Any buffer works, the pool never frees it.
    let mut storage = [0u8; 256];
    let mut pool: Pool = Pool::from_buffer(&mut storage)?;
    let mut arena: Arena = Arena::with_capacity(256)?;

    for frame in 0..3 {
        for i in 0..frame + 2 {
            let ptr = pool.allocate(16)?;
            if let Some(payload) = pool.payload_mut(ptr) {
                payload.fill(i as u8);
            }
            arena.allocate(16)?;
        }

        println!(
            "frame {frame}: pool {} bytes in {} blocks, arena {} bytes",
            pool.bytes_used(),
            pool.blocks().count(),
            arena.bytes_used()
        );

        pool.deallocate_all();
        arena.deallocate_all();
    }

    Ok(())
}
