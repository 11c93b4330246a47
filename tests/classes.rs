mod common;

use common::{run, run_ok};
use rox::Outcome;

#[test]
fn class_and_instance_rendering() {
    assert_eq!(
        run_ok("class Bagel {} print Bagel; print Bagel();"),
        vec!["Bagel", "Bagel instance"]
    );
}

#[test]
fn fields_are_created_on_assignment() {
    let source = "
        class Box {}
        var b = Box();
        b.contents = \"cat\";
        print b.contents;
        b.contents = \"dog\";
        print b.contents;
    ";

    assert_eq!(run_ok(source), vec!["cat", "dog"]);
}

#[test]
fn methods_bind_this() {
    let source = "
        class Person {
            sayName() { print this.name; }
        }

        var jane = Person();
        jane.name = \"Jane\";

        var method = jane.sayName;
        method();

        var bill = Person();
        bill.name = \"Bill\";
        bill.sayName = jane.sayName;
        bill.sayName();
    ";

    // A bound method keeps the instance it was taken from.
    assert_eq!(run_ok(source), vec!["Jane", "Jane"]);
}

#[test]
fn fields_shadow_methods() {
    let source = "
        class C { m() { return \"method\"; } }
        var c = C();
        print c.m();
        c.m = \"field\";
        print c.m;
    ";

    assert_eq!(run_ok(source), vec!["method", "field"]);
}

#[test]
fn initializer_runs_with_arguments() {
    let source = "
        class Point {
            init(x, y) {
                this.x = x;
                this.y = y;
            }
            sum() { return this.x + this.y; }
        }
        print Point(3, 4).sum();
    ";

    assert_eq!(run_ok(source), vec!["7"]);
}

#[test]
fn class_arity_follows_init() {
    let (outcome, _, errors) = run("class P { init(a) {} }\nP();");

    assert_eq!(outcome, Outcome::RuntimeError);
    assert_eq!(errors, vec!["line 2: Expected 1 arguments but got 0."]);

    let (_, _, errors) = run("class Q {}\nQ(1);");
    assert_eq!(errors, vec!["line 2: Expected 0 arguments but got 1."]);
}

#[test]
fn constructor_always_yields_instance() {
    let source = "
        class Early {
            init() {
                this.ready = true;
                return;
                this.ready = false;
            }
        }
        var e = Early();
        print e;
        print e.ready;

        class Ignored {
            init() { return 42; }
        }
        print Ignored();
    ";

    assert_eq!(
        run_ok(source),
        vec!["Early instance", "true", "Ignored instance"]
    );
}

#[test]
fn calling_init_directly_returns_the_instance() {
    let source = "
        class Foo {
            init() { this.count = 0; }
        }
        var foo = Foo();
        foo.count = 5;
        var again = foo.init();
        print again == foo;
        print foo.count;
    ";

    assert_eq!(run_ok(source), vec!["true", "0"]);
}

#[test]
fn inherited_methods_see_the_subclass_instance() {
    let source = "
        class Animal {
            describe() { return this.name + \" says \" + this.sound(); }
        }
        class Dog < Animal {
            init(name) { this.name = name; }
            sound() { return \"woof\"; }
        }
        print Dog(\"Rex\").describe();
    ";

    assert_eq!(run_ok(source), vec!["Rex says woof"]);
}

#[test]
fn super_calls_the_superclass_version() {
    let source = "
        class A {
            method() { return \"A method\"; }
        }
        class B < A {
            method() { return \"B method\"; }
            test() { return super.method(); }
        }
        class C < B {}

        print C().test();
        print C().method();
    ";

    assert_eq!(run_ok(source), vec!["A method", "B method"]);
}

#[test]
fn super_dispatch_is_static_under_polymorphism() {
    let source = "
        class Base {
            greet() { return \"base\"; }
        }
        class Middle < Base {
            greet() { return \"middle+\" + super.greet(); }
        }
        class Leaf < Middle {
            greet() { return \"leaf+\" + super.greet(); }
        }

        fun call(obj) { return obj.greet(); }
        print call(Leaf());
        print call(Middle());
    ";

    assert_eq!(run_ok(source), vec!["leaf+middle+base", "middle+base"]);
}

#[test]
fn super_init_chains() {
    let source = "
        class Shape {
            init(name) { this.name = name; }
        }
        class Square < Shape {
            init(side) {
                super.init(\"square\");
                this.side = side;
            }
        }
        var s = Square(2);
        print s.name;
        print s.side;
    ";

    assert_eq!(run_ok(source), vec!["square", "2"]);
}

#[test]
fn missing_super_method() {
    let (outcome, _, errors) = run("class A {}\nclass B < A { m() { return super.nope(); } }\nB().m();");

    assert_eq!(outcome, Outcome::RuntimeError);
    assert_eq!(errors, vec!["line 2: Undefined property 'nope'."]);
}

#[test]
fn undefined_property() {
    let (outcome, _, errors) = run("class C {}\nprint C().missing;");

    assert_eq!(outcome, Outcome::RuntimeError);
    assert_eq!(errors, vec!["line 2: Undefined property 'missing'."]);
}

#[test]
fn properties_need_instances() {
    let (_, _, errors) = run("var s = \"str\";\nprint s.length;");
    assert_eq!(errors, vec!["line 2: Only instances have properties."]);

    let (_, _, errors) = run("var n = 1;\nn.field = 2;");
    assert_eq!(errors, vec!["line 2: Only instances have fields."]);
}

#[test]
fn superclass_must_be_a_class() {
    let (outcome, _, errors) = run("var NotAClass = \"nope\";\nclass Sub < NotAClass {}");

    assert_eq!(outcome, Outcome::RuntimeError);
    assert_eq!(errors, vec!["line 2: Superclass must be a class."]);
}

#[test]
fn class_cannot_inherit_from_itself() {
    let (outcome, _, errors) = run("class Ouroboros < Ouroboros {}");

    assert_eq!(outcome, Outcome::RuntimeError);
    assert_eq!(errors, vec!["line 1: A class can't inherit from itself."]);
}

#[test]
fn methods_can_refer_to_their_own_class() {
    let source = "
        class Node {
            init(next) { this.next = next; }
            prepend() { return Node(this); }
        }
        var list = Node(nil).prepend().prepend();
        print list.next.next.next;
    ";

    assert_eq!(run_ok(source), vec!["nil"]);
}

#[test]
fn local_classes_and_closures_over_this() {
    let source = "
        {
            class Counter {
                init() { this.n = 0; }
                incrementer() {
                    fun inc() {
                        this.n = this.n + 1;
                        return this.n;
                    }
                    return inc;
                }
            }
            var c = Counter();
            var inc = c.incrementer();
            inc();
            inc();
            print c.n;
        }
    ";

    assert_eq!(run_ok(source), vec!["2"]);
}

#[test]
fn instances_compare_by_identity() {
    let source = "
        class C {}
        var a = C();
        var b = C();
        print a == a;
        print a == b;
        print C == C;
    ";

    assert_eq!(run_ok(source), vec!["true", "false", "true"]);
}
