#![no_main]

use cachetrace::ds::{Chain, LinkedSlots, SlotId};
use libfuzzer_sys::fuzz_target;

// Fuzz several chains sharing one LinkedSlots arena
//
// Tests push, remove, and moving items between chains the way LFU moves
// nodes between frequency buckets.
fuzz_target!(|data: &[u8]| {
    let mut slots: LinkedSlots<u8> = LinkedSlots::new();
    let mut chains: Vec<Chain> = (0..3).map(|_| slots.open_chain()).collect();
    // (chain index, slot) for every live item
    let mut live: Vec<(usize, SlotId)> = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 4;
        let arg = usize::from(pair[1]);
        match op {
            0 => {
                let c = arg % chains.len();
                let id = slots.push_back(&mut chains[c], pair[1]);
                assert_eq!(slots.back(&chains[c]), Some(id));
                live.push((c, id));
            }
            1 => {
                if live.is_empty() {
                    continue;
                }
                let (c, id) = live.swap_remove(arg % live.len());
                assert!(slots.remove(&mut chains[c], id).is_some());
                assert!(slots.get(id).is_none());
            }
            2 => {
                if live.is_empty() {
                    continue;
                }
                let i = arg % live.len();
                let (from, id) = live[i];
                let to = (from + 1) % chains.len();
                assert!(slots.unlink(&mut chains[from], id));
                assert!(slots.link_back(&mut chains[to], id));
                live[i] = (to, id);
            }
            3 => {
                for chain in &chains {
                    let front = slots.front(chain);
                    assert_eq!(front.is_none(), chain.is_empty());
                }
            }
            _ => unreachable!(),
        }

        let total: usize = chains.iter().map(Chain::len).sum();
        assert_eq!(total, slots.len());
        assert_eq!(total, live.len());
        for chain in &chains {
            if let Err(err) = slots.check_chain(chain) {
                panic!("{err}");
            }
        }
    }
});
