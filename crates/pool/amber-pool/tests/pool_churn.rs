use amber_pool::{Pool, PoolHandle};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u32),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Insert),
        2 => any::<usize>().prop_map(Op::Remove),
    ]
}

proptest! {
    /// Live list order, sizes and handle validity track a plain Vec model under churn.
    #[test]
    fn churn_matches_model(ops in proptest::collection::vec(op(), 1..200)) {
        let mut pool = Pool::with_capacity(2);
        let mut live: Vec<(PoolHandle, u32)> = Vec::new();
        let mut dead: Vec<PoolHandle> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(v) => {
                    let h = pool.insert(v).unwrap();
                    live.push((h, v));
                }
                Op::Remove(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let (h, v) = live.remove(pick % live.len());
                    prop_assert_eq!(pool.remove(h), Ok(v));
                    dead.push(h);
                }
            }

            prop_assert_eq!(pool.len(), live.len());
            prop_assert!(pool.len() as u32 <= pool.capacity());
            let capacity = pool.capacity();
            prop_assert!(capacity == 0 || capacity.is_power_of_two());
        }

        let walked: Vec<(PoolHandle, u32)> = pool.iter().map(|(h, v)| (h, *v)).collect();
        prop_assert_eq!(&walked, &live);

        for (h, v) in &live {
            prop_assert_eq!(pool.get(*h), Some(v));
        }
        for h in dead {
            // A dead handle never aliases whatever now occupies its slot.
            prop_assert!(pool.get(h).is_none());
        }
    }

    #[test]
    fn backward_walk_mirrors_forward_walk(
        count in 1u32..64,
        removals in proptest::collection::vec(any::<u32>(), 0..32),
    ) {
        let mut pool = Pool::with_capacity(1);
        let mut handles: Vec<PoolHandle> = (0..count).map(|v| pool.insert(v).unwrap()).collect();
        for r in removals {
            if handles.is_empty() {
                break;
            }
            let h = handles.remove(r as usize % handles.len());
            pool.remove(h).unwrap();
        }

        let mut forward = Vec::new();
        let mut cursor = pool.head_index();
        while let Some(index) = cursor {
            forward.push(index);
            cursor = pool.next_index(index);
        }
        let mut backward = Vec::new();
        let mut cursor = pool.tail_index();
        while let Some(index) = cursor {
            backward.push(index);
            cursor = pool.prev_index(index);
        }
        backward.reverse();
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward, handles.iter().map(|h| h.index()).collect::<Vec<_>>());
    }
}
