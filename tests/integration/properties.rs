//! Property-based tests for cursor, search and scheduling laws

use crate::integration::test_utils::{scripted_scheduler, WAIT};
use layout3d::iterator::{CompositeIterator, Cursor};
use layout3d::job::{JobId, JobRecord, JobStatus};
use layout3d::scene::{descendants, find_node_by_id, SceneNode};
use parking_lot::{Mutex, RwLock};
use proptest::prelude::*;
use std::sync::Arc;

fn build_layout(rooms: &[usize]) -> SceneNode {
    let layout = SceneNode::layout("layout-1", "Main Layout");
    let mut next_item = 1;
    for (r, items) in rooms.iter().enumerate() {
        let room = SceneNode::room(format!("room-{}", r + 1), format!("Room {}", r + 1));
        for _ in 0..*items {
            room.add(SceneNode::item(format!("item-{}", next_item), "Item"))
                .unwrap();
            next_item += 1;
        }
        layout.add(room).unwrap();
    }
    layout
}

proptest! {
    #[test]
    fn test_cursor_yields_each_element_once_then_none(items in prop::collection::vec(any::<u32>(), 0..50)) {
        let mut cursor = CompositeIterator::new(Arc::new(RwLock::new(items.clone())));
        let mut seen = Vec::new();
        while cursor.has_next() {
            seen.push(cursor.next_item().unwrap());
        }
        prop_assert_eq!(seen, items);
        for _ in 0..3 {
            prop_assert!(cursor.next_item().is_none());
            prop_assert!(!cursor.has_next());
        }
    }

    #[test]
    fn test_every_descendant_is_findable(rooms in prop::collection::vec(0usize..6, 0..6)) {
        let layout = build_layout(&rooms);
        let all = descendants(&layout);
        prop_assert_eq!(all.len(), rooms.len() + rooms.iter().sum::<usize>());
        for node in &all {
            let found = find_node_by_id(&layout, node.id()).unwrap();
            prop_assert!(found.ptr_eq(node));
        }
    }

    #[test]
    fn test_item_visits_match_item_count(rooms in prop::collection::vec(0usize..6, 0..6)) {
        let layout = build_layout(&rooms);
        let mut visits = 0;
        let mut room_cursor = layout.create_iterator();
        while let Some(room) = room_cursor.next_item() {
            visits += room.create_iterator().count();
        }
        prop_assert_eq!(visits, rooms.iter().sum::<usize>());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_fifo_law_for_any_durations(delays in prop::collection::vec(0u64..4, 1..8)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (submitted, completed) = runtime.block_on(async {
            let (scheduler, pipeline) = scripted_scheduler();
            let completed: Arc<Mutex<Vec<JobId>>> = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&completed);
            scheduler.subscribe(move |job: &JobRecord| {
                if job.status.is_terminal() {
                    sink.lock().push(job.id.clone());
                }
            });

            let submitted: Vec<JobId> = delays
                .iter()
                .enumerate()
                .map(|(n, ms)| scheduler.submit(format!("sleep:{}:job{}", ms, n)).unwrap())
                .collect();
            scheduler.wait_for_idle(WAIT).await.unwrap();
            assert_eq!(pipeline.max_active(), 1);
            for id in &submitted {
                assert_eq!(scheduler.get_job(id).unwrap().status, JobStatus::Completed);
            }
            let completed = completed.lock().clone();
            (submitted, completed)
        });

        prop_assert_eq!(completed, submitted);
    }
}
